//! Voxel annotation layers and their persistence.
//!
//! Six fat depots are traced independently. Each layer is a byte volume with
//! the same extents as the scan plus a per-slice record of drawing time.

mod layer;
pub mod persist;
mod volume;

#[cfg(test)]
mod tests;

pub use layer::Layer;
pub use persist::{LoadReport, PersistWarning, SaveReport, WarningSeverity};
pub use volume::AnnotationVolume;
