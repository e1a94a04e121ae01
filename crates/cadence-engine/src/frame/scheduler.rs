use crate::present::DisplaySurface;
use crate::sync::{BackendError, SyncError};

use super::error::FrameError;
use super::queue::{SubmissionContext, SubmissionQueue};

/// Number of submission contexts rotated by frame parity.
pub const FRAME_CONTEXT_COUNT: usize = 2;

/// How many frames the GPU may lag behind the CPU after `end_frame` returns.
///
/// With two contexts, one frame of lag is the most that still leaves the next
/// context retired.
pub const MAX_FRAMES_AHEAD: u64 = 1;

/// Submitted count and last observed completed count.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameCadence {
    pub submitted: u64,
    pub completed: u64,
}

impl FrameCadence {
    /// Frames submitted but not yet observed as completed.
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.completed)
    }
}

/// Outcome of a single `end_frame`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based frame number.
    pub frame: u64,

    /// Context the frame was recorded into.
    pub parity: usize,

    /// Fence value signaled for this frame.
    pub submitted: u64,

    /// Completed value observed before returning.
    pub completed: u64,

    /// Whether the call blocked on the fence.
    pub stalled: bool,
}

impl FrameReport {
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.completed)
    }
}

/// Double-buffered frame pacing over a [`SubmissionQueue`].
///
/// Each frame is `begin_frame` (select + reset a context), recording by the
/// caller, then `end_frame` (submit, signal, bounded stall). The stall keeps
/// the GPU at most [`MAX_FRAMES_AHEAD`] frame behind, which is exactly what
/// guarantees the context picked by the next `begin_frame` has been retired.
pub struct FrameScheduler<Q: SubmissionQueue> {
    queue: Q,
    contexts: [Q::Context; FRAME_CONTEXT_COUNT],

    /// Fence value signaled after each context's last submission.
    retire_values: [u64; FRAME_CONTEXT_COUNT],

    cadence: FrameCadence,

    /// Parity of the context being recorded, if a frame is open.
    open: Option<usize>,

    backbuffer_index: u32,
    stall_count: u64,
}

impl<Q: SubmissionQueue> FrameScheduler<Q> {
    pub fn new(queue: Q, contexts: [Q::Context; FRAME_CONTEXT_COUNT]) -> Self {
        Self {
            queue,
            contexts,
            retire_values: [0; FRAME_CONTEXT_COUNT],
            cadence: FrameCadence::default(),
            open: None,
            backbuffer_index: 0,
            stall_count: 0,
        }
    }

    /// Number of frames submitted so far. Also the number of the next frame.
    pub fn frame_count(&self) -> u64 {
        self.cadence.submitted
    }

    pub fn cadence(&self) -> FrameCadence {
        self.cadence
    }

    /// Last fence value signaled.
    pub fn submitted_value(&self) -> u64 {
        self.cadence.submitted
    }

    /// Completed value as of the last fence read. May lag the GPU.
    pub fn observed_completed(&self) -> u64 {
        self.cadence.completed
    }

    /// Writable display image recorded by the last `advance_display`.
    pub fn backbuffer_index(&self) -> u32 {
        self.backbuffer_index
    }

    /// Number of `end_frame` calls that had to block.
    pub fn stall_count(&self) -> u64 {
        self.stall_count
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// Selects the context for the next frame and resets it for recording.
    ///
    /// Never waits: the previous `end_frame` already stalled until this
    /// context's last submission was retired.
    pub fn begin_frame(&mut self) -> Result<&mut Q::Context, FrameError> {
        if let Some(parity) = self.open {
            return Err(FrameError::FrameInProgress { parity });
        }

        let frame = self.cadence.submitted;
        let parity = (frame % FRAME_CONTEXT_COUNT as u64) as usize;

        let retire_value = self.retire_values[parity];
        if self.cadence.completed < retire_value {
            return Err(FrameError::ContextInFlight {
                parity,
                retire_value,
                completed: self.cadence.completed,
            });
        }

        self.contexts[parity]
            .reset()
            .map_err(|source| FrameError::Sync { frame, parity, source })?;

        self.open = Some(parity);
        log::trace!("frame {frame}: recording into context {parity}");

        Ok(&mut self.contexts[parity])
    }

    /// Submits the open frame and paces the CPU against the GPU.
    pub fn end_frame(&mut self) -> Result<FrameReport, FrameError> {
        self.end_frame_with(|| Ok(()))
    }

    /// Like [`FrameScheduler::end_frame`], running `between` after the context
    /// is submitted and before the fence is signaled.
    ///
    /// The presenter uses the hook to queue the present behind the frame's
    /// commands. A failing hook still gets the frame fenced and paced, so the
    /// scheduler stays usable; the hook's error is returned afterwards.
    pub fn end_frame_with<F>(&mut self, between: F) -> Result<FrameReport, FrameError>
    where
        F: FnOnce() -> Result<(), BackendError>,
    {
        let parity = self.open.take().ok_or(FrameError::NoFrameInProgress)?;
        let frame = self.cadence.submitted;
        let sync = move |source: SyncError| FrameError::Sync { frame, parity, source };

        self.queue
            .execute(&mut self.contexts[parity])
            .map_err(sync)?;

        // The context is on the GPU now; fence it even if the present fails.
        let presented = between();

        let submitted = frame + 1;
        self.queue.signal(submitted).map_err(sync)?;
        self.cadence.submitted = submitted;
        self.retire_values[parity] = submitted;

        self.observe_completed(frame, parity)?;

        let mut stalled = false;
        if self.cadence.outstanding() > MAX_FRAMES_AHEAD {
            let target = submitted - MAX_FRAMES_AHEAD;
            log::debug!(
                "frame {frame}: {} frames in flight, waiting for fence {target}",
                self.cadence.outstanding()
            );

            self.queue.wait_until(target).map_err(sync)?;
            self.observe_completed(frame, parity)?;

            stalled = true;
            self.stall_count += 1;
        }

        log::trace!(
            "frame {frame}: submitted {submitted}, completed {}",
            self.cadence.completed
        );

        presented.map_err(|source| FrameError::Present { frame, source })?;

        Ok(FrameReport {
            frame,
            parity,
            submitted,
            completed: self.cadence.completed,
            stalled,
        })
    }

    /// Stores the display's writable image index after a present.
    pub fn advance_display<D>(&mut self, display: &D) -> Result<u32, FrameError>
    where
        D: DisplaySurface + ?Sized,
    {
        let count = display.image_count();
        let index = display.current_image_index();
        if index >= count {
            return Err(FrameError::ImageIndexOutOfRange { index, count });
        }

        self.backbuffer_index = index;
        Ok(index)
    }

    /// Blocks until the GPU has retired every submitted frame.
    pub fn wait_idle(&mut self) -> Result<(), FrameError> {
        let frame = self.cadence.submitted;
        let parity = (frame % FRAME_CONTEXT_COUNT as u64) as usize;

        if self.cadence.completed < self.cadence.submitted {
            self.queue
                .wait_until(self.cadence.submitted)
                .map_err(|source| FrameError::Sync { frame, parity, source })?;
            self.observe_completed(frame, parity)?;
        }

        Ok(())
    }

    fn observe_completed(&mut self, frame: u64, parity: usize) -> Result<(), FrameError> {
        let completed = self
            .queue
            .completed_value()
            .map_err(|source| FrameError::Sync { frame, parity, source })?;

        if completed > self.cadence.submitted {
            return Err(FrameError::FenceAhead {
                completed,
                submitted: self.cadence.submitted,
            });
        }

        self.cadence.completed = self.cadence.completed.max(completed);
        Ok(())
    }
}

#[cfg(test)]
impl<Q: SubmissionQueue> FrameScheduler<Q> {
    pub(crate) fn context(&self, parity: usize) -> &Q::Context {
        &self.contexts[parity]
    }
}
