use thiserror::Error;

use crate::upload::TextureKey;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("Failed to request adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Texture {0:?} has not been allocated")]
    UnknownTexture(TextureKey),

    #[error("No GPU texture format for {channels} channel(s) of {element:?}")]
    UnsupportedFormat {
        channels: u8,
        element: crate::format::RenderElementType,
    },
}

pub type Result<T> = std::result::Result<T, GpuError>;
