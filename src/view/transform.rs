//! Window/voxel coordinate mapping for slice views.
//!
//! A point on screen passes through four transforms on its way to a voxel:
//!
//! - window: pixel coordinates (origin top-left, Y down) to NDC
//! - model: user pan and zoom
//! - view: fixed per view, flips Y for the axial view
//! - volume: voxel extents of the view plane to NDC
//!
//! All transforms are 4x4 homogeneous matrices so the composed MVP can be
//! handed to the renderer unchanged; Z is carried through untouched.

use nalgebra::{Matrix4, Point2, Vector2, Vector4};
use serde::{Deserialize, Serialize};

/// One of the two slice views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    /// Slices at fixed Z
    Axial,
    /// Slices at fixed Y
    Coronal,
}

impl ViewKind {
    /// Both views.
    pub const ALL: [ViewKind; 2] = [ViewKind::Axial, ViewKind::Coronal];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Axial => "axial",
            ViewKind::Coronal => "coronal",
        }
    }
}

/// Anatomical axis of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeAxis {
    /// Left to right
    X,
    /// Posterior to anterior
    Y,
    /// Inferior to superior
    Z,
}

impl VolumeAxis {
    /// Index into `[x, y, z]` arrays.
    pub fn index(self) -> usize {
        match self {
            VolumeAxis::X => 0,
            VolumeAxis::Y => 1,
            VolumeAxis::Z => 2,
        }
    }
}

/// Which volume axes a view shows, and how it is flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisBinding {
    pub kind: ViewKind,
    /// Axis along the screen's horizontal
    pub horizontal: VolumeAxis,
    /// Axis along the screen's vertical
    pub vertical: VolumeAxis,
    /// Axis the view slices through
    pub slicing: VolumeAxis,
    /// Whether the fixed view transform mirrors Y
    pub view_flip_y: bool,
    /// Whether the volume transform mirrors Y
    pub volume_flip: bool,
}

impl AxisBinding {
    /// Fixed Z, showing X across and Y up.
    pub const AXIAL: AxisBinding = AxisBinding {
        kind: ViewKind::Axial,
        horizontal: VolumeAxis::X,
        vertical: VolumeAxis::Y,
        slicing: VolumeAxis::Z,
        view_flip_y: true,
        volume_flip: true,
    };

    /// Fixed Y, showing X across and Z up.
    pub const CORONAL: AxisBinding = AxisBinding {
        kind: ViewKind::Coronal,
        horizontal: VolumeAxis::X,
        vertical: VolumeAxis::Z,
        slicing: VolumeAxis::Y,
        view_flip_y: false,
        volume_flip: false,
    };

    /// Binding of a view.
    pub fn for_kind(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Axial => Self::AXIAL,
            ViewKind::Coronal => Self::CORONAL,
        }
    }

    /// Axis on which the other view's slice plane shows up as a line.
    pub fn crosshair(&self) -> VolumeAxis {
        self.vertical
    }

    /// Extents of the view plane `(width, height)` for volume extents `[x, y, z]`.
    pub fn plane_dims(&self, dims: [usize; 3]) -> (usize, usize) {
        (dims[self.horizontal.index()], dims[self.vertical.index()])
    }

    /// Lift a view-plane point and a slice index to `[x, y, z]`.
    pub fn to_volume(&self, plane: Point2<f64>, slice: f64) -> [f64; 3] {
        let mut out = [0.0; 3];
        out[self.horizontal.index()] = plane.x;
        out[self.vertical.index()] = plane.y;
        out[self.slicing.index()] = slice;
        out
    }

    /// Project `[x, y, z]` onto the view plane.
    pub fn to_plane(&self, volume: [f64; 3]) -> Point2<f64> {
        Point2::new(volume[self.horizontal.index()], volume[self.vertical.index()])
    }
}

/// Composed transforms of one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformChain {
    pub binding: AxisBinding,
    /// Volume extents `[x, y, z]`
    pub dims: [usize; 3],
    /// Pan in NDC units
    pub pan: Vector2<f64>,
    pub zoom: f64,
    /// Window size in pixels
    pub viewport: (u32, u32),
}

impl TransformChain {
    /// Create a chain with no pan and unit zoom.
    pub fn new(binding: AxisBinding, dims: [usize; 3], viewport: (u32, u32)) -> Self {
        Self {
            binding,
            dims,
            pan: Vector2::zeros(),
            zoom: 1.0,
            viewport,
        }
    }

    /// `translate(pan) * scale(zoom)`.
    pub fn model(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.pan.push(0.0))
            * Matrix4::new_nonuniform_scaling(&nalgebra::Vector3::new(self.zoom, self.zoom, 1.0))
    }

    /// Fixed view transform.
    pub fn view(&self) -> Matrix4<f64> {
        if self.binding.view_flip_y {
            flip_y()
        } else {
            Matrix4::identity()
        }
    }

    /// `model * view`.
    pub fn mvp(&self) -> Matrix4<f64> {
        self.model() * self.view()
    }

    /// Voxel plane `[0, w) x [0, h)` to NDC, optionally mirroring Y.
    pub fn volume(&self, flip: bool) -> Matrix4<f64> {
        let (w, h) = self.binding.plane_dims(self.dims);
        let (w, h) = (w.max(1) as f64, h.max(1) as f64);
        let to_ndc = Matrix4::new(
            2.0 / w, 0.0, 0.0, -1.0, //
            0.0, 2.0 / h, 0.0, -1.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );
        if flip { flip_y() * to_ndc } else { to_ndc }
    }

    /// Window pixels to NDC, optionally mirroring Y.
    pub fn window(&self, flip: bool) -> Matrix4<f64> {
        let (w, h) = (self.viewport.0.max(1) as f64, self.viewport.1.max(1) as f64);
        let to_ndc = Matrix4::new(
            2.0 / w, 0.0, 0.0, -1.0, //
            0.0, 2.0 / h, 0.0, -1.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );
        if flip { flip_y() * to_ndc } else { to_ndc }
    }

    /// Voxel plane to window NDC, before the window transform.
    fn forward(&self, include_mvp: bool) -> Matrix4<f64> {
        if include_mvp {
            self.mvp() * self.volume(self.binding.volume_flip)
        } else {
            // the omitted view flip is folded into the volume transform
            self.volume(self.binding.volume_flip ^ self.binding.view_flip_y)
        }
    }

    /// Map a window pixel to view-plane voxel coordinates.
    pub fn window_to_voxel(&self, p: Point2<f64>, include_mvp: bool) -> Point2<f64> {
        let inverse = self
            .forward(include_mvp)
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);
        apply(&(inverse * self.window(true)), p)
    }

    /// Map view-plane voxel coordinates to a window pixel.
    pub fn voxel_to_window(&self, p: Point2<f64>, include_mvp: bool) -> Point2<f64> {
        let window_inverse = self
            .window(true)
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);
        apply(&(window_inverse * self.forward(include_mvp)), p)
    }
}

fn flip_y() -> Matrix4<f64> {
    Matrix4::from_diagonal(&Vector4::new(1.0, -1.0, 1.0, 1.0))
}

fn apply(m: &Matrix4<f64>, p: Point2<f64>) -> Point2<f64> {
    let v = m * Vector4::new(p.x, p.y, 0.0, 1.0);
    Point2::new(v.x / v.w, v.y / v.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-4;

    fn close(a: Point2<f64>, b: Point2<f64>) -> bool {
        (a - b).norm() < EPS
    }

    fn chain(binding: AxisBinding) -> TransformChain {
        TransformChain::new(binding, [64, 48, 30], (800, 600))
    }

    #[test]
    fn test_roundtrip_grid() {
        let pans = [-0.8, 0.0, 0.35];
        let zooms = [0.05, 0.5, 1.0, 2.2, 3.0];
        let points = [(0.0, 0.0), (10.5, 3.25), (63.9, 29.0), (-5.0, 70.0)];

        for binding in [AxisBinding::AXIAL, AxisBinding::CORONAL] {
            for &px in &pans {
                for &zoom in &zooms {
                    let mut c = chain(binding);
                    c.pan = Vector2::new(px, -px * 0.5);
                    c.zoom = zoom;
                    for &(x, y) in &points {
                        let p = Point2::new(x, y);
                        for include_mvp in [true, false] {
                            let back = c.window_to_voxel(c.voxel_to_window(p, include_mvp), include_mvp);
                            assert!(close(back, p), "{:?} {:?} -> {:?}", binding.kind, p, back);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_identity_corners() {
        // with no pan/zoom both paths agree and the top-left pixel is the
        // top of the view plane
        for binding in [AxisBinding::AXIAL, AxisBinding::CORONAL] {
            let c = chain(binding);
            let (w, h) = binding.plane_dims(c.dims);
            let top_left = c.window_to_voxel(Point2::new(0.0, 0.0), true);
            assert!(close(top_left, Point2::new(0.0, h as f64)));
            let bottom_right = c.window_to_voxel(Point2::new(800.0, 600.0), true);
            assert!(close(bottom_right, Point2::new(w as f64, 0.0)));
            assert!(close(
                c.window_to_voxel(Point2::new(123.0, 456.0), false),
                c.window_to_voxel(Point2::new(123.0, 456.0), true)
            ));
        }
    }

    #[test]
    fn test_zoom_scales_about_centre() {
        let mut c = chain(AxisBinding::CORONAL);
        c.zoom = 2.0;
        let centre = c.window_to_voxel(Point2::new(400.0, 300.0), true);
        assert!(close(centre, Point2::new(32.0, 15.0)));
        let corner = c.window_to_voxel(Point2::new(0.0, 0.0), true);
        assert!(close(corner, Point2::new(16.0, 22.5)));
    }

    #[test]
    fn test_binding_lifts_points() {
        let p = Point2::new(3.0, 7.0);
        assert_eq!(AxisBinding::AXIAL.to_volume(p, 5.0), [3.0, 7.0, 5.0]);
        assert_eq!(AxisBinding::CORONAL.to_volume(p, 5.0), [3.0, 5.0, 7.0]);
        assert_eq!(AxisBinding::CORONAL.to_plane([3.0, 5.0, 7.0]), p);
        assert_eq!(AxisBinding::AXIAL.crosshair(), VolumeAxis::Y);
        assert_eq!(AxisBinding::CORONAL.crosshair(), VolumeAxis::Z);
        assert_eq!(AxisBinding::CORONAL.plane_dims([64, 48, 30]), (64, 30));
    }
}
