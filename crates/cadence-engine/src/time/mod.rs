//! Frame timing.
//!
//! - one `FrameClock` per render loop, ticked once per presented frame
//! - one `FpsCounter` fed with the tick timestamps, producing the window title

mod fps;
mod frame_clock;

pub use fps::{FpsCounter, FpsSample};
pub use frame_clock::{FrameClock, FrameTime};
