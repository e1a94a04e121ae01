use thiserror::Error;

/// Boxed error produced by a graphics backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a fence, execution-queue, or submission-context operation.
///
/// Every variant is fatal for the frame loop: a desynchronized cadence would
/// let the CPU overwrite commands the GPU is still reading.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to submit recorded commands")]
    Submit {
        #[source]
        source: BackendError,
    },

    #[error("failed to signal fence value {value}")]
    Signal {
        value: u64,
        #[source]
        source: BackendError,
    },

    #[error("failed to read the fence completed value")]
    Read {
        #[source]
        source: BackendError,
    },

    #[error("failed to wait for fence value {target}")]
    Wait {
        target: u64,
        #[source]
        source: BackendError,
    },

    #[error("failed to reset submission context")]
    Reset {
        #[source]
        source: BackendError,
    },

    #[error("submission context has no recorded commands")]
    NothingRecorded,

    #[error("fence value {target} was never signaled (last signaled {signaled})")]
    NeverSignaled { target: u64, signaled: u64 },
}
