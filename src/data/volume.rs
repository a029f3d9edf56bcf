//! Stitched scan volume for one channel.

use std::ops::Range;

use ndarray::{Array3, ArrayView2, Axis, CowArray, Ix3, s};

use crate::data::orientation::{axis_codes, reorient_to_ras};
use crate::data::source::{RawSubvolume, SpatialUnits};
use crate::data::stitch_config::{SliceRange, StitchConfig};
use crate::error::{Result, TraceError};
use crate::numeric::{NumericType, NumericTypeEntry};

/// Whether an extracted slice or region borrows the volume or copies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceMode {
    /// Borrow the owning array
    #[default]
    View,
    /// Return an independent copy
    Clone,
}

/// Description of the source data a volume was stitched from.
///
/// Two volumes with equal descriptors can be shown together.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    /// Raw voxel-order shape of the upper sub-volume
    pub upper_shape: [usize; 3],
    /// Voxel spacing
    pub spacing: Vec<f32>,
    /// Unit of the spacing
    pub units: SpatialUnits,
    /// NIfTI datatype code
    pub source_type_code: i16,
    /// Bytes per stored sample
    pub bytes_per_element: usize,
}

/// One channel's stitched, RAS-oriented voxel array.
///
/// `data` is indexed `(z, y, x)`; +X points right, +Y anterior, +Z superior.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    data: Array3<f32>,
    sample_type: Option<&'static NumericTypeEntry>,
    source: Option<SourceDescriptor>,
}

impl Volume {
    /// Create an empty, unloaded volume.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stitch an upper and a lower sub-volume into one volume.
    ///
    /// The lower range fills rows `[0, lower_len)` and the upper range fills
    /// rows `[lower_len, z_dim)`.
    pub fn stitch(upper: &RawSubvolume, lower: &RawSubvolume, config: &StitchConfig) -> Result<Self> {
        check_subvolumes(upper, lower)?;

        let sample_type = NumericType::from_source_code(upper.source_type_code).ok_or(
            TraceError::UnsupportedSampleType {
                code: upper.source_type_code,
            },
        )?;

        let upper_ras = to_ras(upper)?;
        let lower_ras = to_ras(lower)?;

        let upper_len = config.upper.len();
        let lower_len = config.lower.len();
        let z_dim = upper_len + lower_len;
        let (x_dim, y_dim) = (upper_ras.shape()[0], upper_ras.shape()[1]);

        if lower_ras.shape()[0] != x_dim || lower_ras.shape()[1] != y_dim {
            return Err(TraceError::incompatible(["dims"]));
        }

        let mut data = Array3::<f32>::zeros((z_dim, y_dim, x_dim));
        copy_range(&mut data, &lower_ras, config.lower, 0, "imageLower")?;
        copy_range(&mut data, &upper_ras, config.upper, lower_len, "imageUpper")?;

        let shape = upper.shape();
        let source = SourceDescriptor {
            upper_shape: [shape[0], shape[1], shape[2]],
            spacing: upper.spacing.clone(),
            units: upper.units,
            source_type_code: upper.source_type_code,
            bytes_per_element: upper.bytes_per_element,
        };

        log::info!(
            "Stitched volume {}x{}x{} ({} lower + {} upper slices, {:?})",
            x_dim,
            y_dim,
            z_dim,
            lower_len,
            upper_len,
            sample_type.kind
        );

        Ok(Self {
            data,
            sample_type: Some(sample_type),
            source: Some(source),
        })
    }

    /// Build a volume directly from a `(z, y, x)` array already in RAS order.
    pub fn from_array(data: Array3<f32>, sample_type: &'static NumericTypeEntry) -> Self {
        let (z, y, x) = data.dim();
        let source = SourceDescriptor {
            upper_shape: [x, y, z],
            spacing: vec![1.0; 3],
            units: SpatialUnits::Millimeter,
            source_type_code: sample_type.source_code.unwrap_or_default(),
            bytes_per_element: sample_type.bytes_per_sample(),
        };
        Self {
            data,
            sample_type: Some(sample_type),
            source: Some(source),
        }
    }

    /// Whether voxel data has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Extent along X.
    pub fn x_dim(&self) -> usize {
        self.data.dim().2
    }

    /// Extent along Y.
    pub fn y_dim(&self) -> usize {
        self.data.dim().1
    }

    /// Extent along Z.
    pub fn z_dim(&self) -> usize {
        self.data.dim().0
    }

    /// Extents as `[x, y, z]`.
    pub fn dims(&self) -> [usize; 3] {
        [self.x_dim(), self.y_dim(), self.z_dim()]
    }

    /// Whether `(x, y, z)` lies inside the volume.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.x_dim() && y < self.y_dim() && z < self.z_dim()
    }

    /// Registry entry of the source sample type.
    pub fn sample_type(&self) -> Option<&'static NumericTypeEntry> {
        self.sample_type
    }

    /// Source descriptor used for compatibility checks.
    pub fn source(&self) -> Option<&SourceDescriptor> {
        self.source.as_ref()
    }

    /// The whole `(z, y, x)` array.
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Whether both volumes can be displayed together.
    pub fn compatible(&self, other: &Volume) -> bool {
        match (&self.source, &other.source) {
            (Some(a), Some(b)) => a == b && self.data.dim() == other.data.dim(),
            _ => false,
        }
    }

    /// Fields in which two volumes differ, for error messages.
    pub fn mismatches(&self, other: &Volume) -> Vec<&'static str> {
        let (Some(a), Some(b)) = (&self.source, &other.source) else {
            return vec!["dims"];
        };
        let mut fields = Vec::new();
        if a.upper_shape != b.upper_shape || self.data.dim() != other.data.dim() {
            fields.push("dims");
        }
        if a.spacing != b.spacing {
            fields.push("spacing");
        }
        if a.units != b.units {
            fields.push("units");
        }
        if a.source_type_code != b.source_type_code || a.bytes_per_element != b.bytes_per_element {
            fields.push("type");
        }
        fields
    }

    /// Slice at fixed Z, indexed `(y, x)`.
    pub fn axial_slice(&self, z: usize) -> Option<ArrayView2<'_, f32>> {
        self.slice_along(Axis(0), z)
    }

    /// Slice at fixed Y, indexed `(z, x)`.
    pub fn coronal_slice(&self, y: usize) -> Option<ArrayView2<'_, f32>> {
        self.slice_along(Axis(1), y)
    }

    /// Slice at fixed X, indexed `(z, y)`.
    pub fn sagittal_slice(&self, x: usize) -> Option<ArrayView2<'_, f32>> {
        self.slice_along(Axis(2), x)
    }

    fn slice_along(&self, axis: Axis, index: usize) -> Option<ArrayView2<'_, f32>> {
        if !self.is_loaded() || index >= self.data.len_of(axis) {
            return None;
        }
        Some(self.data.index_axis(axis, index))
    }

    /// Sub-block with `ranges` given in `(z, y, x)` order.
    ///
    /// Returns `None` when a range is empty or exceeds the volume.
    pub fn region(&self, ranges: [Range<usize>; 3], mode: SliceMode) -> Option<CowArray<'_, f32, Ix3>> {
        if !self.is_loaded() {
            return None;
        }
        let (z_dim, y_dim, x_dim) = self.data.dim();
        let [z, y, x] = ranges;
        let fits = |r: &Range<usize>, dim: usize| r.start < r.end && r.end <= dim;
        if !fits(&z, z_dim) || !fits(&y, y_dim) || !fits(&x, x_dim) {
            return None;
        }

        let view = self.data.slice(s![z, y, x]);
        Some(match mode {
            SliceMode::View => CowArray::from(view),
            SliceMode::Clone => CowArray::from(view.to_owned()),
        })
    }
}

/// Check that two sub-volumes can be stitched, listing every mismatch.
fn check_subvolumes(upper: &RawSubvolume, lower: &RawSubvolume) -> Result<()> {
    if upper.data.ndim() != 3 || lower.data.ndim() != 3 {
        return Err(TraceError::incompatible([format!(
            "dims (expected 3D, got {}D and {}D)",
            upper.data.ndim(),
            lower.data.ndim()
        )]));
    }

    let mut mismatched = Vec::new();
    if upper.shape()[0] != lower.shape()[0] || upper.shape()[1] != lower.shape()[1] {
        mismatched.push("dims");
    }
    if upper.spacing != lower.spacing {
        mismatched.push("spacing");
    }
    if upper.units != lower.units {
        mismatched.push("units");
    }
    if upper.source_type_code != lower.source_type_code
        || upper.bytes_per_element != lower.bytes_per_element
    {
        mismatched.push("type");
    }

    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(TraceError::incompatible(mismatched))
    }
}

/// Reorient a raw sub-volume into an `(x, y, z)` RAS array.
fn to_ras(raw: &RawSubvolume) -> Result<Array3<f32>> {
    let data = raw
        .data
        .view()
        .into_dimensionality::<Ix3>()
        .map_err(|e| TraceError::incompatible([format!("dims ({})", e)]))?
        .to_owned();
    reorient_to_ras(data, axis_codes(&raw.affine))
}

/// Copy `range` of an `(x, y, z)` array into rows starting at `dest_row` of a
/// `(z, y, x)` array.
fn copy_range(
    dest: &mut Array3<f32>,
    ras: &Array3<f32>,
    range: SliceRange,
    dest_row: usize,
    element: &str,
) -> Result<()> {
    let available = ras.shape()[2];
    if range.superior >= available {
        return Err(TraceError::config_invalid(format!(
            "<{}> superiorSlice {} exceeds the sub-volume's {} slices",
            element, range.superior, available
        )));
    }

    let zyx = ras.view().reversed_axes();
    let source = zyx.slice(s![range.inferior..=range.superior, .., ..]);
    dest.slice_mut(s![dest_row..dest_row + range.len(), .., ..])
        .assign(&source);
    Ok(())
}
