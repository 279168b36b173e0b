use anyhow::{anyhow, Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::types::RegionSize;

/// Owns the surface/device/queue triple for one mounted backdrop.
///
/// Field order is load-bearing: the surface must drop before the instance
/// that produced it, so the instance sits last.
pub(crate) struct GpuContext {
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    limits: wgpu::Limits,
    size: RegionSize,
    _instance: wgpu::Instance,
}

impl GpuContext {
    /// Creates a configured surface over `target` at `size`.
    ///
    /// Any failure (no handles, no adapter, device refusal, oversized
    /// region) surfaces as an error for the mount boundary to collapse;
    /// resources created before the failure drop on the way out.
    pub fn new<T>(target: &T, size: RegionSize) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::default();
        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        if size.width > max_dimension || size.height > max_dimension {
            anyhow::bail!(
                "region {width}x{height} exceeds the GPU max texture dimension {max_dimension}",
                width = size.width,
                height = size.height
            );
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        // Prefer an alpha mode that lets the compositor blend the backdrop
        // over whatever sits behind the window.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| surface_caps.alpha_modes.contains(mode))
        .unwrap_or(surface_caps.alpha_modes[0]);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("lightwell device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        tracing::debug!(
            width = size.width,
            height = size.height,
            format = ?surface_format,
            ?alpha_mode,
            "configured backdrop surface"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            limits,
            size,
            _instance: instance,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> RegionSize {
        self.size
    }

    /// Reconfigures the swapchain to `size`. Zero or oversized requests are
    /// ignored, which keeps the call idempotent and safe at any rate.
    pub fn resize(&mut self, size: RegionSize) -> bool {
        if size.is_empty() || size == self.size {
            return false;
        }
        let max_dimension = self.limits.max_texture_dimension_2d;
        if size.width > max_dimension || size.height > max_dimension {
            tracing::warn!(
                width = size.width,
                height = size.height,
                max_dimension,
                "resize exceeds GPU limits; keeping previous surface size"
            );
            return false;
        }

        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    /// Re-applies the current configuration after a lost/outdated swapchain.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }
}
