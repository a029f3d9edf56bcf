//! Scan volumes: reading, orientation and stitching.
//!
//! A dataset directory holds an upper and a lower sub-volume for each of the
//! fat and water channels plus a `config.xml` naming the Z range to keep from
//! each. Sub-volumes are read through a `SubvolumeSource`, reoriented to RAS
//! and stitched into one `Volume` per channel.
//!
//! ```rust,ignore
//! use fattrace::data::{Dataset, NiftiSource};
//!
//! let dataset = Dataset::load(Path::new("subject01"), &NiftiSource)?;
//! let axial = dataset.fat.axial_slice(40);
//! ```

mod dataset;
mod nifti_source;
pub mod orientation;
mod source;
mod stitch_config;
mod volume;

pub use dataset::{Dataset, DatasetPaths};
pub use nifti_source::{NiftiSource, affine_from_header};
pub use source::{RawSubvolume, SpatialUnits, SubvolumeSource};
pub use stitch_config::{SliceRange, StitchConfig};
pub use volume::{SliceMode, SourceDescriptor, Volume};
