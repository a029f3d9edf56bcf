//! Session tests against an in-memory scan reader.


use std::path::Path;

use ndarray::Array3;

use crate::constants::DATASET_CONFIG_FILE;
use crate::data::{RawSubvolume, SubvolumeSource};
use crate::error::{Result, TraceError};

pub(crate) const X: usize = 8;
pub(crate) const Y: usize = 6;
/// Slices per sub-volume on disk
pub(crate) const SUB_Z: usize = 4;
/// Stitched slices: upper 0..=2 and lower 0..=1
pub(crate) const Z: usize = 5;

/// Reader that fabricates every scan; the value encodes the channel.
pub(crate) struct SyntheticSource;

impl SubvolumeSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["syn"]
    }

    fn read(&self, path: &Path) -> Result<RawSubvolume> {
        let name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let scale = match name.as_str() {
            "fatUpper" | "fatLower" => 1.0,
            "waterUpper" | "waterLower" => 2.0,
            _ => return Err(TraceError::file_not_found(path)),
        };
        let data = Array3::from_shape_fn((X, Y, SUB_Z), |(x, y, z)| scale * (x + y + z) as f32);
        Ok(RawSubvolume::new(data.into_dyn(), 16, 4))
    }
}

/// Dataset directory holding only the stitch configuration.
pub(crate) fn dataset_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(DATASET_CONFIG_FILE),
        r#"<config><imageUpper inferiorSlice="0" superiorSlice="2"/><imageLower inferiorSlice="0" superiorSlice="1"/></config>"#,
    )
    .unwrap();
    dir
}
