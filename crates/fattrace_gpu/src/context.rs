use crate::config::GpuConfig;
use crate::error::Result;

/// GPU device and queue used for texture uploads.
///
/// The context is headless: presentation belongs to whoever owns the window,
/// which can hand its own device and queue over with [`GpuContext::from_parts`].
#[derive(Clone)]
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: GpuConfig,
}

impl GpuContext {
    /// Initialize a headless GPU context with default configuration.
    pub async fn new() -> Result<Self> {
        Self::with_config(GpuConfig::default()).await
    }

    /// Initialize a headless GPU context, blocking the calling thread.
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }

    /// Wrap an existing device and queue.
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            config: GpuConfig::default(),
        }
    }

    /// Initialize a headless GPU context with custom configuration.
    pub async fn with_config(config: GpuConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let limits = wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Slice Upload Device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            device,
            queue,
            config,
        })
    }

    /// Largest texture side the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
