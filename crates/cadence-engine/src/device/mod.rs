//! wgpu backend for the frame scheduler.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and its depth target
//! - implementing the submission seam (`WgpuQueue`, `WgpuContext`)
//! - implementing the display seam on top of the surface

mod depth;
mod error;
mod gpu;
mod init;
mod submit;
mod surface;

pub use depth::{DepthTarget, DEPTH_FORMAT};
pub use error::SurfaceErrorAction;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use submit::{WgpuContext, WgpuQueue};
