use std::collections::HashMap;

use crate::config::TextureConfig;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::format::texture_format;
use crate::upload::{TextureDesc, TextureKey, TextureUpload};

/// GPU texture wrapper for one 2D slice.
pub struct SliceTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub desc: TextureDesc,
}

impl SliceTexture {
    /// Create a texture and upload `data` into it.
    pub fn new(
        ctx: &GpuContext,
        desc: &TextureDesc,
        data: &[u8],
        config: &TextureConfig,
    ) -> Result<Self> {
        desc.validate(data)?;

        let format = texture_format(desc.format, desc.element).ok_or(GpuError::UnsupportedFormat {
            channels: desc.format.channels(),
            element: desc.element,
        })?;

        let max = ctx.max_texture_dimension();
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(GpuError::Texture(format!(
                "Texture size {}x{} outside 1..={}",
                desc.width, desc.height, max
            )));
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Slice Texture"),
            size: extent(desc),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Slice Sampler"),
            mag_filter: config.filter,
            min_filter: config.filter,
            ..Default::default()
        });

        let slice = Self {
            texture,
            view,
            sampler,
            desc: *desc,
        };
        slice.write(ctx, data)?;
        Ok(slice)
    }

    /// Overwrite the texture contents in place.
    pub fn write(&self, ctx: &GpuContext, data: &[u8]) -> Result<()> {
        self.desc.validate(data)?;

        ctx.queue.write_texture(
            self.texture.as_image_copy(),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.desc.bytes_per_row() as u32),
                rows_per_image: Some(self.desc.height),
            },
            extent(&self.desc),
        );
        Ok(())
    }
}

fn extent(desc: &TextureDesc) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: desc.width,
        height: desc.height,
        depth_or_array_layers: 1,
    }
}

/// [`TextureUpload`] implementation holding real wgpu textures.
pub struct WgpuTextureStore {
    ctx: GpuContext,
    config: TextureConfig,
    textures: HashMap<TextureKey, SliceTexture>,
    allocations: usize,
    updates: usize,
}

impl WgpuTextureStore {
    /// Create an empty store on the given context.
    pub fn new(ctx: GpuContext) -> Self {
        Self::with_config(ctx, TextureConfig::default())
    }

    /// Create an empty store with custom sampling configuration.
    pub fn with_config(ctx: GpuContext, config: TextureConfig) -> Self {
        Self {
            ctx,
            config,
            textures: HashMap::new(),
            allocations: 0,
            updates: 0,
        }
    }

    /// Look up the texture for a key.
    pub fn get(&self, key: TextureKey) -> Option<&SliceTexture> {
        self.textures.get(&key)
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check whether no textures are held.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Number of full allocations performed so far.
    pub fn allocation_count(&self) -> usize {
        self.allocations
    }

    /// Number of in-place updates performed so far.
    pub fn update_count(&self) -> usize {
        self.updates
    }
}

impl TextureUpload for WgpuTextureStore {
    fn allocate(&mut self, key: TextureKey, desc: &TextureDesc, data: &[u8]) -> Result<()> {
        let texture = SliceTexture::new(&self.ctx, desc, data, &self.config)?;
        if self.textures.insert(key, texture).is_some() {
            log::debug!("Reallocated texture {:?} at {}x{}", key, desc.width, desc.height);
        }
        self.allocations += 1;
        Ok(())
    }

    fn update(&mut self, key: TextureKey, data: &[u8]) -> Result<()> {
        let texture = self.textures.get(&key).ok_or(GpuError::UnknownTexture(key))?;
        texture.write(&self.ctx, data)?;
        self.updates += 1;
        Ok(())
    }

    fn release(&mut self, key: TextureKey) {
        if self.textures.remove(&key).is_some() {
            log::debug!("Released texture {:?}", key);
        }
    }
}
