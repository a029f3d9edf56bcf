//! Raw sub-volumes and the reader trait that produces them.

use std::path::Path;

use nalgebra::Matrix4;
use ndarray::ArrayD;

use crate::error::Result;

/// Spatial unit of voxel spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialUnits {
    /// Not stated by the file
    #[default]
    Unknown,
    /// Metres
    Meter,
    /// Millimetres
    Millimeter,
    /// Micrometres
    Micron,
}

impl SpatialUnits {
    /// Decode the spatial part of a NIfTI `xyzt_units` byte.
    pub fn from_nifti(xyzt_units: u8) -> Self {
        match xyzt_units & 0x07 {
            1 => SpatialUnits::Meter,
            2 => SpatialUnits::Millimeter,
            3 => SpatialUnits::Micron,
            _ => SpatialUnits::Unknown,
        }
    }
}

/// One decoded scan file, before orientation correction and stitching.
///
/// `data` is indexed in the file's voxel order `(i, j, k)`, `i` varying
/// fastest on disk. The affine maps `(i, j, k, 1)` to world (RAS+) millimetres.
#[derive(Debug, Clone)]
pub struct RawSubvolume {
    /// Voxel samples widened to f32
    pub data: ArrayD<f32>,
    /// Voxel spacing per axis
    pub spacing: Vec<f32>,
    /// Unit of `spacing`
    pub units: SpatialUnits,
    /// NIfTI datatype code of the stored samples
    pub source_type_code: i16,
    /// Bytes per stored sample
    pub bytes_per_element: usize,
    /// Voxel-to-world transform
    pub affine: Matrix4<f64>,
}

impl RawSubvolume {
    /// Create a raw sub-volume with an identity (already RAS) affine.
    pub fn new(data: ArrayD<f32>, source_type_code: i16, bytes_per_element: usize) -> Self {
        let spacing = vec![1.0; data.ndim()];
        Self {
            data,
            spacing,
            units: SpatialUnits::Millimeter,
            source_type_code,
            bytes_per_element,
            affine: Matrix4::identity(),
        }
    }

    /// Replace the affine.
    pub fn with_affine(mut self, affine: Matrix4<f64>) -> Self {
        self.affine = affine;
        self
    }

    /// Replace the voxel spacing.
    pub fn with_spacing(mut self, spacing: Vec<f32>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Replace the spatial units.
    pub fn with_units(mut self, units: SpatialUnits) -> Self {
        self.units = units;
        self
    }

    /// Array extents in voxel order.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// Reader for scan files.
///
/// The scan codec lives behind this trait so the loading transaction can be
/// driven by synthetic data in tests.
pub trait SubvolumeSource {
    /// Human-readable name for log messages.
    fn name(&self) -> &'static str;

    /// File extensions handled, most preferred first (without leading dot).
    fn extensions(&self) -> &'static [&'static str];

    /// Read one sub-volume.
    fn read(&self, path: &Path) -> Result<RawSubvolume>;
}
