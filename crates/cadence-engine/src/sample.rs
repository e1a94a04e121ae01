//! The triangle sample: one window's worth of GPU state and frame pacing.

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::config::SampleConfig;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction, WgpuQueue};
use crate::frame::{FrameReport, FrameScheduler};
use crate::pipeline::{ShaderPair, TrianglePipeline};
use crate::present::Presenter;
use crate::record::TriangleRecorder;

/// Result of one `render` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented(FrameReport),
    /// No image could be acquired (minimized, reconfigured or timed out).
    Skipped,
}

/// Owns the GPU, scheduler and recorder for the lifetime of the window.
pub struct Sample<'w> {
    config: SampleConfig,
    gpu: Gpu<'w>,
    scheduler: FrameScheduler<WgpuQueue>,
    recorder: TriangleRecorder,
}

impl<'w> Sample<'w> {
    /// Validates the configuration, loads the shaders and builds every GPU
    /// object the frame loop needs.
    pub async fn new(window: &'w Window, config: SampleConfig, gpu_init: GpuInit) -> Result<Self> {
        config.validate().context("invalid sample configuration")?;

        let shaders = ShaderPair::load(&config.vertex_shader, &config.fragment_shader)
            .context("failed to load shader stages")?;

        let gpu = Gpu::new(
            window,
            GpuInit {
                swap_buffer_count: config.swap_buffer_count,
                ..gpu_init
            },
        )
        .await?;

        let pipeline = TrianglePipeline::new(gpu.device(), &shaders, gpu.surface_format());
        let recorder = TriangleRecorder::new(gpu.device(), pipeline, &config)
            .context("invalid frame recipe")?;

        let (queue, contexts) = gpu.submission_backend();
        let scheduler = FrameScheduler::new(queue, contexts);

        Ok(Self {
            config,
            gpu,
            scheduler,
            recorder,
        })
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn scheduler(&self) -> &FrameScheduler<WgpuQueue> {
        &self.scheduler
    }

    /// Records, submits and presents one frame.
    pub fn render(&mut self) -> Result<FrameOutcome> {
        if self.gpu.is_minimized() {
            return Ok(FrameOutcome::Skipped);
        }

        if let Err(err) = self.gpu.acquire_image() {
            let message = err.to_string();
            return match self.gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => {
                    Err(anyhow::anyhow!("failed to acquire surface image: {message}"))
                }
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                    Ok(FrameOutcome::Skipped)
                }
            };
        }

        let targets = self
            .gpu
            .targets()
            .context("surface image missing after acquire")?;

        let context = self.scheduler.begin_frame()?;
        self.recorder.record(context, &targets)?;

        let report = Presenter::present(&mut self.scheduler, &mut self.gpu)?;
        Ok(FrameOutcome::Presented(report))
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Waits for the GPU to retire every frame. Call before dropping.
    pub fn shutdown(&mut self) -> Result<()> {
        self.scheduler
            .wait_idle()
            .context("failed to drain the GPU before shutdown")?;

        log::info!(
            "shut down after {} frames ({} stalls)",
            self.scheduler.frame_count(),
            self.scheduler.stall_count()
        );
        Ok(())
    }
}
