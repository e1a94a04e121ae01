use crate::sync::SyncError;

/// A reusable command recording slot.
pub trait SubmissionContext {
    /// Discards previous contents and prepares the slot for recording.
    ///
    /// Only called once the GPU has retired everything previously recorded
    /// into this slot.
    fn reset(&mut self) -> Result<(), SyncError>;
}

/// An execution queue paired with its completion fence.
///
/// Values passed to [`SubmissionQueue::signal`] are strictly increasing and
/// start at 1. The completed value starts at 0 and only moves forward.
pub trait SubmissionQueue {
    type Context: SubmissionContext;

    /// Hands the recorded context to the GPU for asynchronous execution.
    fn execute(&mut self, context: &mut Self::Context) -> Result<(), SyncError>;

    /// Enqueues a fence signal behind all work submitted so far.
    fn signal(&mut self, value: u64) -> Result<(), SyncError>;

    /// Returns the highest fence value the GPU has reached.
    fn completed_value(&mut self) -> Result<u64, SyncError>;

    /// Blocks the calling thread until the fence reaches `value`.
    fn wait_until(&mut self, value: u64) -> Result<(), SyncError>;
}
