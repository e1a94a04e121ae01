use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::frame::{SwapRing, FRAME_CONTEXT_COUNT};
use crate::present::DisplaySurface;
use crate::record::FrameTargets;
use crate::sync::BackendError;

use super::depth::DepthTarget;
use super::submit::{WgpuContext, WgpuQueue};
use super::surface;
use super::{GpuInit, SurfaceErrorAction};

/// Surface image acquired for the frame being recorded.
struct AcquiredImage {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Owns wgpu core objects, the surface configuration and the depth target.
///
/// Also acts as the display for the frame scheduler: wgpu hides the
/// swapchain's image index, so a [`SwapRing`] tracks the flip-sequential
/// rotation across presents.
pub struct Gpu<'w> {
    /// Window the surface presents to; outlives the `Gpu`.
    window: &'w Window,

    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    depth: DepthTarget,
    ring: SwapRing,
    acquired: Option<AcquiredImage>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cadence device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);
        let present_mode = surface::choose_present_mode(&caps, init.present_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::info!(
            "surface {}x{} {format:?} {present_mode:?}, {} images",
            size.width,
            size.height,
            init.swap_buffer_count
        );

        let depth = DepthTarget::new(&device, size.width, size.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            ring: SwapRing::new(init.swap_buffer_count),
            acquired: None,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Builds the execution queue and the two submission contexts.
    pub fn submission_backend(&self) -> (WgpuQueue, [WgpuContext; FRAME_CONTEXT_COUNT]) {
        let queue = WgpuQueue::new(&self.device, &self.queue);
        let contexts = std::array::from_fn(|parity| WgpuContext::new(&self.device, parity));
        (queue, contexts)
    }

    /// Reconfigures the surface and depth target after a resize.
    ///
    /// A 0x0 size (minimized window) only updates internal state.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.acquired = None;

        let configured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );

        if configured {
            self.depth = DepthTarget::new(&self.device, new_size.width, new_size.height);
            log::debug!("surface resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// True when the surface cannot currently be rendered to.
    pub fn is_minimized(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// Acquires the next surface image for recording.
    pub fn acquire_image(&mut self) -> std::result::Result<(), SurfaceError> {
        if self.acquired.is_some() {
            return Ok(());
        }

        let texture = self.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.acquired = Some(AcquiredImage { texture, view });
        Ok(())
    }

    /// Attachments of the acquired image, if any.
    pub fn targets(&self) -> Option<FrameTargets<'_>> {
        self.acquired.as_ref().map(|image| FrameTargets {
            color: &image.view,
            depth: self.depth.view(),
            extent: self.depth.extent(),
        })
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::for_error(&err);
        log::warn!("surface error: {err} ({action:?})");

        if action == SurfaceErrorAction::Reconfigured && !self.is_minimized() {
            self.surface.configure(&self.device, &self.config);
        }

        action
    }
}

impl DisplaySurface for Gpu<'_> {
    fn image_count(&self) -> u32 {
        self.ring.image_count()
    }

    fn current_image_index(&self) -> u32 {
        self.ring.current()
    }

    fn present(&mut self) -> std::result::Result<(), BackendError> {
        let image = self
            .acquired
            .take()
            .ok_or("present without an acquired surface image")?;

        if image.texture.suboptimal {
            log::debug!("presenting suboptimal surface image");
        }

        drop(image.view);
        self.window.pre_present_notify();
        image.texture.present();
        self.ring.advance();
        Ok(())
    }
}
