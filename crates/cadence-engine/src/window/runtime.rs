use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::SampleConfig;
use crate::device::GpuInit;
use crate::input::is_quit_key;
use crate::sample::{FrameOutcome, Sample};
use crate::time::{FpsCounter, FrameClock};

/// Window configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub title: String,

    /// Client area size. Physical, so the surface matches the configured
    /// resolution regardless of DPI scaling.
    pub initial_size: PhysicalSize<u32>,
}

impl RuntimeConfig {
    pub fn for_sample(config: &SampleConfig) -> Self {
        Self {
            title: config.title.clone(),
            initial_size: PhysicalSize::new(config.width, config.height),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and renders until it is closed or Escape is pressed.
    ///
    /// Returns the first fatal error raised inside the loop.
    pub fn run(config: SampleConfig, gpu_init: GpuInit) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    fps: FpsCounter,

    window: Window,

    #[borrows(window)]
    #[covariant]
    sample: Sample<'this>,
}

struct AppState {
    config: SampleConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: SampleConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            entry: None,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = RuntimeConfig::for_sample(&self.config);
        let attrs = Window::default_attributes()
            .with_title(window_config.title)
            .with_inner_size(window_config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let config = self.config.clone();
        let gpu_init = self.gpu_init.clone();
        let now = Instant::now();

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::starting_at(now),
            fps: FpsCounter::new(now),
            window,
            sample_builder: |w| pollster::block_on(Sample::new(w, config, gpu_init)),
        }
        .try_build()
        .context("sample initialization failed")?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Drains the GPU and releases the window.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.entry.take() {
            if let Err(e) = entry.with_sample_mut(|sample| sample.shutdown()) {
                self.failure.get_or_insert(e);
            }
        }
        event_loop.exit();
    }

    /// Stores the first fatal error for `Runtime::run` to return.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.failure.get_or_insert(err);
        self.shutdown(event_loop);
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(());
        };

        entry.with_mut(|fields| {
            let outcome = fields.sample.render()?;

            if let FrameOutcome::Presented(report) = outcome {
                let ft = fields.clock.tick();
                log::trace!(
                    "frame {} presented after {:?} ({} outstanding)",
                    report.frame,
                    ft.dt,
                    report.outstanding()
                );

                if let Some(sample) = fields.fps.frame(ft.now) {
                    fields.window.set_title(&sample.title(fields.sample.title()));
                }
            }

            Ok(())
        })
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Render continuously; pacing comes from the frame scheduler.
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::KeyboardInput { event, .. }
                if is_quit_key(event.physical_key, event.state) =>
            {
                log::info!("escape pressed, exiting");
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_sample_mut(|sample| sample.resize(new_size));
                    entry.with_clock_mut(|clock| clock.reset());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_sample_mut(|sample| sample.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            self.shutdown(event_loop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_matches_sample_resolution() {
        let config = SampleConfig::default();
        let window = RuntimeConfig::for_sample(&config);
        assert_eq!(window.title, "Triangle");
        assert_eq!(window.initial_size, PhysicalSize::new(1920, 1080));
    }
}
