//! CPU-side synchronization primitives.
//!
//! The frame scheduler only needs one abstraction from the platform: a
//! monotonically increasing counter that one side advances and the other side
//! can block on until it reaches a target. `CpuFence` provides exactly that.

mod error;
mod fence;

pub use error::{BackendError, SyncError};
pub use fence::CpuFence;
