//! Error types for loading, stitching and persisting scan data.

use std::path::PathBuf;
use thiserror::Error;

use crate::annotation::Layer;

/// Errors that can occur while loading volumes or reading/writing annotations.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Upper and lower sub-volumes (or fat and water volumes) cannot be combined
    #[error("Incompatible sub-volumes: mismatched {}", mismatched.join(", "))]
    IncompatibleSubvolumes {
        /// Names of the fields that differ (dims, spacing, units, type)
        mismatched: Vec<String>,
    },

    /// The scan's sample type has no entry in the numeric type registry
    #[error("Unsupported sample type code {code}")]
    UnsupportedSampleType {
        /// Source (NIfTI datatype) code of the scan
        code: i16,
    },

    /// The scan's affine cannot be mapped onto the anatomical axes
    #[error("Invalid orientation: {message}")]
    InvalidOrientation {
        /// Description of the orientation problem
        message: String,
    },

    /// Annotation file was written for a volume with a different slice count
    #[error("Dimension mismatch in {path:?}: expected {expected} slices, found {found}")]
    DimensionMismatch {
        /// File declaring the wrong dimension
        path: PathBuf,
        /// Z extent of the loaded volume
        expected: usize,
        /// Z extent declared by the file
        found: usize,
    },

    /// Annotation point lies outside the loaded volume
    #[error("Point ({x}, {y}, {z}) of layer {layer} is outside the volume")]
    PointOutOfBounds {
        /// Layer the point belongs to
        layer: Layer,
        /// X voxel index
        x: i64,
        /// Y voxel index
        y: i64,
        /// Z voxel index
        z: i64,
    },

    /// Required file does not exist
    #[error("File not found: {path:?}")]
    FileNotFound {
        /// Path where the file was expected
        path: PathBuf,
    },

    /// File exists but its content cannot be parsed
    #[error("Cannot read {path:?}: {message}")]
    FileUnreadable {
        /// Path of the unreadable file
        path: PathBuf,
        /// Description of the parse failure
        message: String,
    },

    /// Stitch configuration is missing values or holds invalid ranges
    #[error("Invalid stitch configuration: {message}")]
    ConfigInvalid {
        /// Description of the configuration error
        message: String,
    },

    /// Operation needs a loaded dataset
    #[error("No dataset is loaded")]
    NoDataset,

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// NumPy export error
    #[error("NPY error: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// PNG export error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Texture upload error
    #[error("GPU error: {0}")]
    Gpu(#[from] fattrace_gpu::GpuError),
}

impl TraceError {
    /// Create an incompatible sub-volume error listing the mismatched fields.
    pub fn incompatible<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self::IncompatibleSubvolumes {
            mismatched: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an invalid orientation error.
    pub fn invalid_orientation(message: impl Into<String>) -> Self {
        Self::InvalidOrientation {
            message: message.into(),
        }
    }

    /// Create a stitch configuration error.
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    /// Create a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an unreadable-file error.
    pub fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileUnreadable {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, TraceError>;
