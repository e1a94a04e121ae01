use thiserror::Error;

use crate::sync::{BackendError, SyncError};

/// Frame scheduler failure.
///
/// Protocol variants indicate a caller bug; `Sync` and `Present` wrap backend
/// failures. None of them is recoverable inside the frame loop.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("begin_frame called while context {parity} is still being recorded")]
    FrameInProgress { parity: usize },

    #[error("end_frame called without an open frame")]
    NoFrameInProgress,

    #[error(
        "context {parity} selected while the GPU may still read it \
         (retire value {retire_value}, completed {completed})"
    )]
    ContextInFlight {
        parity: usize,
        retire_value: u64,
        completed: u64,
    },

    #[error("fence reports {completed} completed but only {submitted} submitted")]
    FenceAhead { completed: u64, submitted: u64 },

    #[error("display reported image index {index}, expected one of 0..{count}")]
    ImageIndexOutOfRange { index: u32, count: u32 },

    #[error("present request for frame {frame} failed")]
    Present {
        frame: u64,
        #[source]
        source: BackendError,
    },

    #[error("frame {frame} on context {parity}")]
    Sync {
        frame: u64,
        parity: usize,
        #[source]
        source: SyncError,
    },
}
