//! Frame pacing.
//!
//! The scheduler rotates two submission contexts with frame parity and keeps
//! the CPU at most one frame ahead of the GPU. It is generic over the
//! execution queue so the protocol can be driven by the wgpu backend at runtime
//! and by simulated queues in tests.

mod error;
mod queue;
mod scheduler;
mod swap_ring;


pub use error::FrameError;
pub use queue::{SubmissionContext, SubmissionQueue};
pub use scheduler::{FrameCadence, FrameReport, FrameScheduler, FRAME_CONTEXT_COUNT, MAX_FRAMES_AHEAD};
pub use swap_ring::SwapRing;
