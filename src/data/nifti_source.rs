//! NIfTI-1 scan reader.

use std::path::Path;

use nalgebra::Matrix4;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use ndarray::{ArrayD, IxDyn};

use crate::data::source::{RawSubvolume, SpatialUnits, SubvolumeSource};
use crate::error::{Result, TraceError};

/// Reads `.nii` and `.nii.gz` files with the `nifti` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiSource;

impl SubvolumeSource for NiftiSource {
    fn name(&self) -> &'static str {
        "NIfTI"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["nii", "nii.gz"]
    }

    fn read(&self, path: &Path) -> Result<RawSubvolume> {
        if !path.exists() {
            return Err(TraceError::file_not_found(path));
        }

        let obj = ReaderOptions::new()
            .read_file(path)
            .map_err(|e| TraceError::unreadable(path, e.to_string()))?;
        let header = obj.header().clone();

        // Flatten in logical order; the crate's array type is never named so
        // its ndarray version stays private to it.
        let volume = obj
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(|e| TraceError::unreadable(path, e.to_string()))?;
        let shape = volume.shape().to_vec();
        let samples: Vec<f32> = volume.iter().copied().collect();

        let data = ArrayD::from_shape_vec(IxDyn(&shape), samples)
            .map_err(|e| TraceError::unreadable(path, e.to_string()))?;

        let ndim = data.ndim().min(7);
        let spacing = header.pixdim[1..=ndim].iter().map(|v| v.abs()).collect();
        let bytes_per_element = (header.bitpix.max(0) / 8) as usize;

        log::info!(
            "Read {:?}: shape {:?}, datatype {}, sform_code {}, qform_code {}",
            path,
            shape,
            header.datatype,
            header.sform_code,
            header.qform_code
        );

        Ok(RawSubvolume::new(data, header.datatype, bytes_per_element)
            .with_spacing(spacing)
            .with_units(SpatialUnits::from_nifti(header.xyzt_units))
            .with_affine(affine_from_header(&header)))
    }
}

/// Voxel-to-world transform of a header.
///
/// sform wins when present, then the qform quaternion, then a pixdim diagonal.
pub fn affine_from_header(header: &NiftiHeader) -> Matrix4<f64> {
    if header.sform_code > 0 {
        let [x, y, z] = [header.srow_x, header.srow_y, header.srow_z].map(|row| row.map(f64::from));
        return Matrix4::new(
            x[0], x[1], x[2], x[3], //
            y[0], y[1], y[2], y[3], //
            z[0], z[1], z[2], z[3], //
            0.0, 0.0, 0.0, 1.0,
        );
    }

    let pixdim = header.pixdim.map(f64::from);
    if header.qform_code > 0 {
        let (b, c, d) = (
            f64::from(header.quatern_b),
            f64::from(header.quatern_c),
            f64::from(header.quatern_d),
        );
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
        let qfac = if pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let (sx, sy, sz) = (pixdim[1], pixdim[2], qfac * pixdim[3]);
        return Matrix4::new(
            (a * a + b * b - c * c - d * d) * sx,
            2.0 * (b * c - a * d) * sy,
            2.0 * (b * d + a * c) * sz,
            f64::from(header.quatern_x),
            2.0 * (b * c + a * d) * sx,
            (a * a + c * c - b * b - d * d) * sy,
            2.0 * (c * d - a * b) * sz,
            f64::from(header.quatern_y),
            2.0 * (b * d - a * c) * sx,
            2.0 * (c * d + a * b) * sy,
            (a * a + d * d - b * b - c * c) * sz,
            f64::from(header.quatern_z),
            0.0,
            0.0,
            0.0,
            1.0,
        );
    }

    let scale = |v: f64| if v == 0.0 { 1.0 } else { v };
    Matrix4::new(
        scale(pixdim[1]), 0.0, 0.0, 0.0, //
        0.0, scale(pixdim[2]), 0.0, 0.0, //
        0.0, 0.0, scale(pixdim[3]), 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}
