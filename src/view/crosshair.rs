//! Crosshair line marking the other view's slice plane.

use nalgebra::Point2;

use crate::constants::MIN_CROSSHAIR_THICKNESS;
use crate::view::transform::TransformChain;

/// A horizontal line in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    /// Line thickness in pixels
    pub thickness: f64,
}

impl Crosshair {
    /// Line through voxel row `row` of the view plane.
    ///
    /// The line sits at the row's centre and spans the plane's full width;
    /// its thickness is the on-screen height of one row.
    pub fn compute(chain: &TransformChain, row: usize) -> Self {
        let (width, _) = chain.binding.plane_dims(chain.dims);
        let row = row as f64;

        let lower = chain.voxel_to_window(Point2::new(0.0, row), true);
        let upper = chain.voxel_to_window(Point2::new(0.0, row + 1.0), true);
        let thickness = (upper - lower).norm().max(MIN_CROSSHAIR_THICKNESS);

        let centre = row + 0.5;
        Self {
            start: chain.voxel_to_window(Point2::new(0.0, centre), true),
            end: chain.voxel_to_window(Point2::new(width as f64, centre), true),
            thickness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::transform::AxisBinding;

    #[test]
    fn test_coronal_crosshair() {
        // 10 slices over 100 px: each row is 10 px tall
        let chain = TransformChain::new(AxisBinding::CORONAL, [20, 8, 10], (200, 100));
        let line = Crosshair::compute(&chain, 0);
        assert!((line.thickness - 10.0).abs() < 1e-9);
        assert!((line.start.y - 95.0).abs() < 1e-9);
        assert!((line.start.x - 0.0).abs() < 1e-9);
        assert!((line.end.x - 200.0).abs() < 1e-9);
        assert!((line.end.y - line.start.y).abs() < 1e-9);
    }

    #[test]
    fn test_thickness_floor() {
        let mut chain = TransformChain::new(AxisBinding::AXIAL, [512, 512, 10], (100, 100));
        chain.zoom = 0.05;
        let line = Crosshair::compute(&chain, 100);
        assert_eq!(line.thickness, MIN_CROSSHAIR_THICKNESS);
    }
}
