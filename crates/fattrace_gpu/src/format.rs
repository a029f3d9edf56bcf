//! Upload format descriptors.
//!
//! A texture upload is described by a channel layout and an element type, the
//! same pair a classic graphics API takes as `format`/`type`. The pair is
//! resolved to a concrete `wgpu::TextureFormat` only at allocation time.

/// Channel layout of uploaded texel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl RenderFormat {
    /// Number of channels per texel.
    pub fn channels(self) -> u8 {
        match self {
            RenderFormat::Red => 1,
            RenderFormat::Rg => 2,
            RenderFormat::Rgb => 3,
            RenderFormat::Rgba => 4,
        }
    }

    /// Layout for the given channel count (1-4).
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(RenderFormat::Red),
            2 => Some(RenderFormat::Rg),
            3 => Some(RenderFormat::Rgb),
            4 => Some(RenderFormat::Rgba),
            _ => None,
        }
    }
}

/// Scalar element type of uploaded texel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl RenderElementType {
    /// Size of one element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            RenderElementType::U8 | RenderElementType::I8 => 1,
            RenderElementType::U16 | RenderElementType::I16 => 2,
            RenderElementType::U32 | RenderElementType::I32 | RenderElementType::F32 => 4,
            RenderElementType::F64 => 8,
        }
    }
}

/// Resolve a format/element pair to a wgpu texture format.
///
/// Returns `None` for combinations the GPU cannot hold as a sampled texture
/// (three-channel layouts and 64-bit floats).
pub fn texture_format(
    format: RenderFormat,
    element: RenderElementType,
) -> Option<wgpu::TextureFormat> {
    use RenderElementType as E;
    use wgpu::TextureFormat as T;

    let resolved = match (format, element) {
        (RenderFormat::Red, E::U8) => T::R8Unorm,
        (RenderFormat::Red, E::I8) => T::R8Snorm,
        (RenderFormat::Red, E::U16) => T::R16Uint,
        (RenderFormat::Red, E::I16) => T::R16Sint,
        (RenderFormat::Red, E::U32) => T::R32Uint,
        (RenderFormat::Red, E::I32) => T::R32Sint,
        (RenderFormat::Red, E::F32) => T::R32Float,

        (RenderFormat::Rg, E::U8) => T::Rg8Unorm,
        (RenderFormat::Rg, E::I8) => T::Rg8Snorm,
        (RenderFormat::Rg, E::U16) => T::Rg16Uint,
        (RenderFormat::Rg, E::I16) => T::Rg16Sint,
        (RenderFormat::Rg, E::U32) => T::Rg32Uint,
        (RenderFormat::Rg, E::I32) => T::Rg32Sint,
        (RenderFormat::Rg, E::F32) => T::Rg32Float,

        (RenderFormat::Rgba, E::U8) => T::Rgba8Unorm,
        (RenderFormat::Rgba, E::I8) => T::Rgba8Snorm,
        (RenderFormat::Rgba, E::U16) => T::Rgba16Uint,
        (RenderFormat::Rgba, E::I16) => T::Rgba16Sint,
        (RenderFormat::Rgba, E::U32) => T::Rgba32Uint,
        (RenderFormat::Rgba, E::I32) => T::Rgba32Sint,
        (RenderFormat::Rgba, E::F32) => T::Rgba32Float,

        (RenderFormat::Rgb, _) | (_, E::F64) => return None,
    };

    Some(resolved)
}
