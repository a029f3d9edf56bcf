//! Device and sampling options.

/// Adapter selection for the headless context.
#[derive(Debug, Clone)]
pub struct GpuConfig {
    pub power_preference: wgpu::PowerPreference,
    /// Backends the instance may pick an adapter from.
    pub backends: wgpu::Backends,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::default(),
            backends: wgpu::Backends::PRIMARY,
        }
    }
}

impl GpuConfig {
    pub fn with_power_preference(mut self, pref: wgpu::PowerPreference) -> Self {
        self.power_preference = pref;
        self
    }

    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }
}

/// How slice textures are sampled when drawn larger or smaller than a voxel.
///
/// Addressing is always clamp-to-edge; slices never tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureConfig {
    pub filter: wgpu::FilterMode,
}

impl Default for TextureConfig {
    /// Voxels are shown as blocks.
    fn default() -> Self {
        Self::nearest()
    }
}

impl TextureConfig {
    pub fn nearest() -> Self {
        Self {
            filter: wgpu::FilterMode::Nearest,
        }
    }

    /// Bilinear sampling. Needs a filterable format such as `R8Unorm`.
    pub fn linear() -> Self {
        Self {
            filter: wgpu::FilterMode::Linear,
        }
    }
}
