//! Renderer-facing texture upload interface.
//!
//! Views hand 2D slice data to an implementation of [`TextureUpload`]. The
//! first upload into a slot allocates it; later uploads of the same size
//! overwrite it in place. Callers track which of the two they need.

use crate::error::Result;
use crate::format::{RenderElementType, RenderFormat};

/// Identifies one texture slot owned by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(pub u32);

/// Size and layout of a 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: RenderFormat,
    pub element: RenderElementType,
}

impl TextureDesc {
    /// Create a new descriptor.
    pub fn new(width: u32, height: u32, format: RenderFormat, element: RenderElementType) -> Self {
        Self {
            width,
            height,
            format,
            element,
        }
    }

    /// Bytes in one row of texels.
    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * self.format.channels() as usize * self.element.size_bytes()
    }

    /// Bytes required for the whole texture.
    pub fn byte_len(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    /// Check that `data` holds exactly one texture's worth of bytes.
    pub fn validate(&self, data: &[u8]) -> Result<()> {
        if data.len() != self.byte_len() {
            return Err(crate::GpuError::Texture(format!(
                "Invalid data size: expected {} bytes for {}x{} {:?}/{:?}, got {}",
                self.byte_len(),
                self.width,
                self.height,
                self.format,
                self.element,
                data.len()
            )));
        }
        Ok(())
    }
}

/// Destination for slice texture uploads.
pub trait TextureUpload {
    /// Allocate (or reallocate) the texture for `key` and fill it with `data`.
    fn allocate(&mut self, key: TextureKey, desc: &TextureDesc, data: &[u8]) -> Result<()>;

    /// Overwrite the already allocated texture for `key` in place.
    ///
    /// `data` must match the descriptor the slot was allocated with.
    fn update(&mut self, key: TextureKey, data: &[u8]) -> Result<()>;

    /// Free the texture for `key`. Unknown keys are ignored.
    fn release(&mut self, key: TextureKey);
}
