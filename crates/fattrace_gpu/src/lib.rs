//! GPU texture upload for fattrace slice views.

pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod texture;
pub mod upload;

pub use config::{GpuConfig, TextureConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use format::{RenderElementType, RenderFormat, texture_format};
pub use texture::{SliceTexture, WgpuTextureStore};
pub use upload::{TextureDesc, TextureKey, TextureUpload};
