//! Cadence engine crate.
//!
//! Double-buffered CPU/GPU frame pacing and the wgpu, winit and recording
//! glue needed to drive it from a window.

pub mod config;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod present;
pub mod record;
pub mod sample;
pub mod sync;
pub mod time;
pub mod window;
