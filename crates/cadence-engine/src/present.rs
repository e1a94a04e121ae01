//! Presentation.
//!
//! The presenter owns no state. It submits the open frame through the
//! scheduler, queues a present behind it, and lets the scheduler pick up the
//! next writable image.

use crate::frame::{FrameError, FrameReport, FrameScheduler, SubmissionQueue};
use crate::sync::BackendError;

/// A rotating pool of display images.
pub trait DisplaySurface {
    /// Number of images in the pool. Fixed for the surface lifetime.
    fn image_count(&self) -> u32;

    /// Index of the image currently writable, in `0..image_count()`.
    fn current_image_index(&self) -> u32;

    /// Queues the current image for display.
    ///
    /// Must not wait for vertical sync.
    fn present(&mut self) -> Result<(), BackendError>;
}

/// Submits recorded frames and presents them.
pub struct Presenter;

impl Presenter {
    /// Ends the open frame, presenting it between submission and the fence
    /// signal, then refreshes the scheduler's backbuffer index.
    pub fn present<Q, D>(
        scheduler: &mut FrameScheduler<Q>,
        display: &mut D,
    ) -> Result<FrameReport, FrameError>
    where
        Q: SubmissionQueue,
        D: DisplaySurface + ?Sized,
    {
        let report = scheduler.end_frame_with(|| display.present())?;
        scheduler.advance_display(&*display)?;
        Ok(report)
    }
}
