//! Orientation codes and reorientation to RAS.
//!
//! Every voxel axis of a scan points (mostly) along one anatomical axis. The
//! code for a voxel axis names the direction its index increases towards:
//! `R`/`L` for the left-right axis, `A`/`P` for front-back, `S`/`I` for
//! head-foot. A RAS array has codes `[R, A, S]`.

use nalgebra::Matrix4;
use ndarray::{Array3, Axis};

use crate::error::{Result, TraceError};

/// Direction a voxel axis increases towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCode {
    /// Right
    R,
    /// Left
    L,
    /// Anterior
    A,
    /// Posterior
    P,
    /// Superior
    S,
    /// Inferior
    I,
}

impl AxisCode {
    /// World axis index (0 = left-right, 1 = front-back, 2 = head-foot).
    pub fn world_axis(self) -> usize {
        match self {
            AxisCode::R | AxisCode::L => 0,
            AxisCode::A | AxisCode::P => 1,
            AxisCode::S | AxisCode::I => 2,
        }
    }

    /// Whether the axis points along the RAS positive direction.
    pub fn is_ras(self) -> bool {
        matches!(self, AxisCode::R | AxisCode::A | AxisCode::S)
    }

    fn from_world(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => AxisCode::R,
            (0, false) => AxisCode::L,
            (1, true) => AxisCode::A,
            (1, false) => AxisCode::P,
            (_, true) => AxisCode::S,
            (_, false) => AxisCode::I,
        }
    }
}

/// Orientation codes of the three voxel axes of an affine.
///
/// For each voxel axis the world axis with the largest absolute direction
/// cosine wins; its sign picks the direction.
pub fn axis_codes(affine: &Matrix4<f64>) -> [AxisCode; 3] {
    let mut codes = [AxisCode::R; 3];
    for (voxel_axis, code) in codes.iter_mut().enumerate() {
        let column = affine.fixed_view::<3, 1>(0, voxel_axis);
        let (world_axis, value) = column
            .iter()
            .enumerate()
            .fold((0, 0.0_f64), |best, (axis, &v)| {
                if v.abs() > best.1.abs() { (axis, v) } else { best }
            });
        *code = AxisCode::from_world(world_axis, value >= 0.0);
    }
    codes
}

/// Reorient a voxel-order `(i, j, k)` array so its axes are `(x=R, y=A, z=S)`.
///
/// Voxel axes are first permuted onto their world axes, then every axis
/// pointing L, P or I is mirrored.
pub fn reorient_to_ras(data: Array3<f32>, codes: [AxisCode; 3]) -> Result<Array3<f32>> {
    let mut source_of = [usize::MAX; 3];
    for (voxel_axis, code) in codes.iter().enumerate() {
        let world = code.world_axis();
        if source_of[world] != usize::MAX {
            return Err(TraceError::invalid_orientation(format!(
                "voxel axes {} and {} both run along {:?}",
                source_of[world], voxel_axis, code
            )));
        }
        source_of[world] = voxel_axis;
    }

    let mut ras = data.permuted_axes(source_of);
    for (world, &voxel_axis) in source_of.iter().enumerate() {
        if !codes[voxel_axis].is_ras() {
            ras.invert_axis(Axis(world));
        }
    }

    if codes != [AxisCode::R, AxisCode::A, AxisCode::S] {
        log::debug!("Reoriented {:?} to RAS", codes);
    }

    Ok(ras)
}
