//! Axial and coronal slice views.
//!
//! Both views share one implementation parameterised by an `AxisBinding`:
//! the transform chain maps window pixels to voxels and back, `ViewState`
//! holds what the user controls, and `ViewController` turns that state into
//! uploaded textures and per-frame draw data.

pub mod controller;
pub mod crosshair;
pub mod pixel;
pub mod state;
pub mod transform;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::color_utils::ColorMap;
pub use controller::{FrameData, OverlayDraw, SliceDraw, ViewController};
pub use crosshair::Crosshair;
pub use state::{Channel, DirtyFlags, DisplayMode, Location, LocationUpdate, ViewState, clamp_zoom};
pub use transform::{AxisBinding, TransformChain, ViewKind, VolumeAxis};
