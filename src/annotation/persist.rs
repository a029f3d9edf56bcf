//! Annotation save/load.
//!
//! Each layer is written as a sparse point list `<LAYER>.txt`:
//!
//! ```text
//! <z_dim>
//! #<z>
//! <count>
//! <x> <y> <z>
//! ...
//! ```
//!
//! Only slices holding marks get a `#<z>` block. Drawing time per slice goes
//! to `times/<LAYER>.txt`:
//!
//! ```text
//! <z_dim>
//! #<z> <H>h <M>m <S>s <MS>ms
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::annotation::{AnnotationVolume, Layer};
use crate::constants::TIMES_DIR;
use crate::error::{Result, TraceError};

/// Severity of a persistence warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Informational message, not a problem.
    Info,
    /// Something was skipped.
    Warning,
    /// A layer could not be read or written.
    Error,
}

/// A per-layer problem collected during save or load.
#[derive(Debug, Clone)]
pub struct PersistWarning {
    /// Layer the warning relates to
    pub layer: Layer,
    /// File involved, if any
    pub path: Option<PathBuf>,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: WarningSeverity,
}

impl PersistWarning {
    /// Create a new warning.
    pub fn new(layer: Layer, message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            layer,
            path: None,
            message: message.into(),
            severity,
        }
    }

    /// Create an info-level warning.
    pub fn info(layer: Layer, message: impl Into<String>) -> Self {
        Self::new(layer, message, WarningSeverity::Info)
    }

    /// Create a warning-level warning.
    pub fn warning(layer: Layer, message: impl Into<String>) -> Self {
        Self::new(layer, message, WarningSeverity::Warning)
    }

    /// Create an error-level warning.
    pub fn error(layer: Layer, message: impl Into<String>) -> Self {
        Self::new(layer, message, WarningSeverity::Error)
    }

    /// Attach the file path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Outcome of `save`.
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    /// Layers whose points file was written
    pub layers_saved: Vec<Layer>,
    /// Total points written
    pub points_written: usize,
    /// Files created or overwritten
    pub files_created: Vec<PathBuf>,
    /// Problems encountered
    pub warnings: Vec<PersistWarning>,
}

/// Outcome of `load`.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Layers whose points were applied
    pub layers_loaded: Vec<Layer>,
    /// Total points applied
    pub points_loaded: usize,
    /// Problems encountered
    pub warnings: Vec<PersistWarning>,
}

macro_rules! report_helpers {
    ($ty:ty) => {
        impl $ty {
            /// Create an empty report.
            pub fn new() -> Self {
                Self::default()
            }

            /// Add a warning to the report.
            pub fn add_warning(&mut self, warning: PersistWarning) {
                log::warn!("{}: {}", warning.layer, warning.message);
                self.warnings.push(warning);
            }

            /// Check if there were any warnings.
            pub fn has_warnings(&self) -> bool {
                !self.warnings.is_empty()
            }

            /// Check if any layer failed.
            pub fn has_errors(&self) -> bool {
                self.warnings
                    .iter()
                    .any(|w| w.severity == WarningSeverity::Error)
            }
        }
    };
}

report_helpers!(SaveReport);
report_helpers!(LoadReport);

/// Points file of a layer inside `dir`.
pub fn points_path(dir: &Path, layer: Layer) -> PathBuf {
    dir.join(layer.file_name())
}

/// Times file of a layer inside `dir`.
pub fn times_path(dir: &Path, layer: Layer) -> PathBuf {
    dir.join(TIMES_DIR).join(layer.file_name())
}

/// Write every layer of `annotations` into `dir`.
///
/// Layers are written independently; a layer that fails is reported and the
/// rest are still written. Only failing to create the directories is fatal.
pub fn save(annotations: &AnnotationVolume, dir: &Path) -> Result<SaveReport> {
    std::fs::create_dir_all(dir.join(TIMES_DIR))?;

    let mut report = SaveReport::new();
    for layer in Layer::ALL {
        let path = points_path(dir, layer);
        let points = annotations.marked_points(layer);
        match std::fs::write(&path, format_points(annotations.z_dim(), &points)) {
            Ok(()) => {
                report.layers_saved.push(layer);
                report.points_written += points.len();
                report.files_created.push(path);
            }
            Err(e) => {
                report.add_warning(
                    PersistWarning::error(layer, format!("points not saved: {}", e)).with_path(path),
                );
                continue;
            }
        }

        let path = times_path(dir, layer);
        match std::fs::write(&path, format_times(annotations.slice_times(layer))) {
            Ok(()) => report.files_created.push(path),
            Err(e) => report.add_warning(
                PersistWarning::warning(layer, format!("times not saved: {}", e)).with_path(path),
            ),
        }
    }

    log::info!(
        "Saved {} layers ({} points) to {:?}",
        report.layers_saved.len(),
        report.points_written,
        dir
    );
    Ok(report)
}

/// Read annotations from `dir` for a volume of extents `[x, y, z]`.
///
/// A file declaring a different slice count fails the whole load. Any other
/// problem empties that layer and is reported. The returned volume is fresh;
/// callers replace their state with it only on `Ok`.
pub fn load(dir: &Path, dims: [usize; 3]) -> Result<(AnnotationVolume, LoadReport)> {
    let [x_dim, y_dim, z_dim] = dims;
    let mut annotations = AnnotationVolume::with_dims(x_dim, y_dim, z_dim);
    let mut report = LoadReport::new();

    for layer in Layer::ALL {
        let path = points_path(dir, layer);
        match read_points(&path, layer, dims) {
            Ok(points) => {
                for &[x, y, z] in &points {
                    annotations.set(layer, x, y, z);
                }
                report.layers_loaded.push(layer);
                report.points_loaded += points.len();
            }
            Err(e @ TraceError::DimensionMismatch { .. }) => return Err(e),
            Err(e) => {
                report.add_warning(PersistWarning::error(layer, e.to_string()).with_path(path));
                continue;
            }
        }

        let path = times_path(dir, layer);
        if !path.exists() {
            report.add_warning(
                PersistWarning::info(layer, "no times file, drawing times start at zero")
                    .with_path(path),
            );
            continue;
        }
        match read_times(&path, z_dim) {
            Ok(times) => {
                for (z, time) in times {
                    annotations.set_slice_time(layer, z, time);
                }
            }
            Err(e @ TraceError::DimensionMismatch { .. }) => return Err(e),
            Err(e) => {
                report.add_warning(PersistWarning::warning(layer, e.to_string()).with_path(path))
            }
        }
    }

    log::info!(
        "Loaded {} layers ({} points) from {:?}",
        report.layers_loaded.len(),
        report.points_loaded,
        dir
    );
    Ok((annotations, report))
}

/// Write one layer's marks as a `(z, y, x)` `.npy` array.
pub fn export_layer_npy(annotations: &AnnotationVolume, layer: Layer, path: &Path) -> Result<()> {
    let data = annotations
        .layer(layer)
        .ok_or_else(|| TraceError::unreadable(path, "annotation volume is not allocated"))?;
    ndarray_npy::write_npy(path, data)?;
    log::info!("Exported {} marks to {:?}", layer, path);
    Ok(())
}

fn format_points(z_dim: usize, points: &[[usize; 3]]) -> String {
    let mut out = format!("{}\n", z_dim);
    for slice in points.chunk_by(|a, b| a[2] == b[2]) {
        let _ = writeln!(out, "#{}", slice[0][2]);
        let _ = writeln!(out, "{}", slice.len());
        for &[x, y, z] in slice {
            let _ = writeln!(out, "{} {} {}", x as f64, y as f64, z as f64);
        }
    }
    out
}

fn format_times(times: &[Duration]) -> String {
    let mut out = format!("{}\n", times.len());
    for (z, time) in times.iter().enumerate() {
        let total_ms = time.as_millis();
        let _ = writeln!(
            out,
            "#{} {}h {}m {}s {}ms",
            z,
            total_ms / 3_600_000,
            total_ms / 60_000 % 60,
            total_ms / 1000 % 60,
            total_ms % 1000
        );
    }
    out
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(TraceError::file_not_found(path));
    }
    std::fs::read_to_string(path).map_err(|e| TraceError::unreadable(path, e.to_string()))
}

/// Parse the leading slice count and compare it with the volume.
fn check_z_dim<'a>(
    path: &Path,
    lines: &mut impl Iterator<Item = &'a str>,
    z_dim: usize,
) -> Result<()> {
    let header = lines
        .next()
        .ok_or_else(|| TraceError::unreadable(path, "file is empty"))?;
    let found: usize = header
        .parse()
        .map_err(|_| TraceError::unreadable(path, format!("bad slice count '{}'", header)))?;
    if found != z_dim {
        return Err(TraceError::DimensionMismatch {
            path: path.to_path_buf(),
            expected: z_dim,
            found,
        });
    }
    Ok(())
}

fn read_points(path: &Path, layer: Layer, dims: [usize; 3]) -> Result<Vec<[usize; 3]>> {
    let content = read_file(path)?;
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    check_z_dim(path, &mut lines, dims[2])?;

    let mut points = Vec::new();
    while let Some(line) = lines.next() {
        if !line.starts_with('#') {
            return Err(TraceError::unreadable(
                path,
                format!("expected a '#<z>' slice header, found '{}'", line),
            ));
        }
        let count_line = lines
            .next()
            .ok_or_else(|| TraceError::unreadable(path, format!("missing count after '{}'", line)))?;
        let count: usize = count_line
            .parse()
            .map_err(|_| TraceError::unreadable(path, format!("bad point count '{}'", count_line)))?;

        for _ in 0..count {
            let point_line = lines
                .next()
                .ok_or_else(|| TraceError::unreadable(path, format!("slice {} is truncated", line)))?;
            points.push(parse_point(path, layer, point_line, dims)?);
        }
    }
    Ok(points)
}

fn parse_point(path: &Path, layer: Layer, line: &str, dims: [usize; 3]) -> Result<[usize; 3]> {
    let coords: Vec<f64> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| TraceError::unreadable(path, format!("bad point '{}'", line)))?;
    let &[x, y, z] = coords.as_slice() else {
        return Err(TraceError::unreadable(path, format!("bad point '{}'", line)));
    };
    if ![x, y, z].iter().all(|v| v.is_finite()) {
        return Err(TraceError::unreadable(path, format!("bad point '{}'", line)));
    }

    let [x, y, z] = [x, y, z].map(|v| v.round() as i64);
    let inside = |v: i64, dim: usize| v >= 0 && (v as usize) < dim;
    if !(inside(x, dims[0]) && inside(y, dims[1]) && inside(z, dims[2])) {
        return Err(TraceError::PointOutOfBounds { layer, x, y, z });
    }
    Ok([x as usize, y as usize, z as usize])
}

fn read_times(path: &Path, z_dim: usize) -> Result<Vec<(usize, Duration)>> {
    let content = read_file(path)?;
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    check_z_dim(path, &mut lines, z_dim)?;

    let bad = |line: &str| TraceError::unreadable(path, format!("bad time line '{}'", line));
    let mut times = Vec::new();
    for line in lines {
        let mut parts = line.split_whitespace();
        let z: usize = parts
            .next()
            .and_then(|p| p.strip_prefix('#'))
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| bad(line))?;

        let mut ms: u64 = 0;
        for (suffix, scale) in [("h", 3_600_000u64), ("m", 60_000), ("s", 1000), ("ms", 1)] {
            let value: u64 = parts
                .next()
                .and_then(|p| p.strip_suffix(suffix))
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| bad(line))?;
            ms = value
                .checked_mul(scale)
                .and_then(|v| ms.checked_add(v))
                .ok_or_else(|| bad(line))?;
        }

        if z < z_dim {
            times.push((z, Duration::from_millis(ms)));
        }
    }
    Ok(times)
}
