use std::collections::VecDeque;

use crate::frame::{SubmissionContext, SubmissionQueue};
use crate::sync::{CpuFence, SyncError};

/// Command encoder slot reused every other frame.
///
/// `reset` replaces the encoder; the previous one was either finished and
/// submitted or is dropped unsubmitted.
pub struct WgpuContext {
    device: wgpu::Device,
    label: String,
    encoder: Option<wgpu::CommandEncoder>,
}

impl WgpuContext {
    pub fn new(device: &wgpu::Device, parity: usize) -> Self {
        Self {
            device: device.clone(),
            label: format!("cadence context {parity}"),
            encoder: None,
        }
    }

    /// Encoder being recorded, if the context was reset since its last submission.
    pub fn encoder_mut(&mut self) -> Option<&mut wgpu::CommandEncoder> {
        self.encoder.as_mut()
    }

    fn take_encoder(&mut self) -> Option<wgpu::CommandEncoder> {
        self.encoder.take()
    }
}

impl SubmissionContext for WgpuContext {
    fn reset(&mut self) -> Result<(), SyncError> {
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&self.label),
            });
        self.encoder = Some(encoder);
        Ok(())
    }
}

/// Bookkeeping for fence signals over a backend's submission handles.
///
/// Tracks which submission each signaled value covers so a wait can target
/// the right one, and drops entries once the fence has passed them.
#[derive(Debug)]
struct SignalLedger<I> {
    /// Submission that the next signal covers.
    last_submission: Option<I>,

    /// Signaled values not yet seen completed, oldest first.
    pending: VecDeque<(u64, Option<I>)>,

    signaled: u64,
}

/// What a wait for a fence value has to do.
#[derive(Debug, PartialEq, Eq)]
enum WaitPlan<I> {
    /// The fence already passed the target.
    Done,
    /// Poll the device, targeting the submission if one is known.
    Poll(Option<I>),
}

impl<I: Clone> SignalLedger<I> {
    fn new() -> Self {
        Self {
            last_submission: None,
            pending: VecDeque::new(),
            signaled: 0,
        }
    }

    fn submitted(&mut self, index: I) {
        self.last_submission = Some(index);
    }

    /// Records a signal. Values must strictly increase.
    fn signal(&mut self, value: u64) -> Result<(), SyncError> {
        if value <= self.signaled {
            return Err(SyncError::Signal {
                value,
                source: format!("fence already signaled {}", self.signaled).into(),
            });
        }

        self.pending.push_back((value, self.last_submission.take()));
        self.signaled = value;
        Ok(())
    }

    fn retire(&mut self, completed: u64) {
        while self.pending.front().is_some_and(|(v, _)| *v <= completed) {
            self.pending.pop_front();
        }
    }

    fn wait_plan(&self, target: u64, completed: u64) -> Result<WaitPlan<I>, SyncError> {
        if completed >= target {
            return Ok(WaitPlan::Done);
        }
        if target > self.signaled {
            return Err(SyncError::NeverSignaled {
                target,
                signaled: self.signaled,
            });
        }

        let submission = self
            .pending
            .iter()
            .find(|(v, _)| *v >= target)
            .and_then(|(_, index)| index.clone());

        Ok(WaitPlan::Poll(submission))
    }
}

/// Execution queue backed by `wgpu::Queue`.
///
/// wgpu has no native fence object. Each signal registers a work-done
/// callback that advances a [`CpuFence`] to the signaled value; waits drive
/// `Device::poll` until the callback has run.
pub struct WgpuQueue {
    device: wgpu::Device,
    queue: wgpu::Queue,
    fence: CpuFence,
    ledger: SignalLedger<wgpu::SubmissionIndex>,
}

impl WgpuQueue {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            fence: CpuFence::new(),
            ledger: SignalLedger::new(),
        }
    }

    /// Fence advanced by the GPU completion callbacks.
    pub fn fence(&self) -> &CpuFence {
        &self.fence
    }

    fn poll(&self, poll: wgpu::PollType, target: u64) -> Result<(), SyncError> {
        self.device
            .poll(poll)
            .map(|_| ())
            .map_err(|e| SyncError::Wait {
                target,
                source: e.into(),
            })
    }
}

impl SubmissionQueue for WgpuQueue {
    type Context = WgpuContext;

    fn execute(&mut self, context: &mut WgpuContext) -> Result<(), SyncError> {
        let encoder = context.take_encoder().ok_or(SyncError::NothingRecorded)?;
        let index = self.queue.submit(std::iter::once(encoder.finish()));
        self.ledger.submitted(index);
        Ok(())
    }

    fn signal(&mut self, value: u64) -> Result<(), SyncError> {
        self.ledger.signal(value)?;

        let fence = self.fence.clone();
        self.queue
            .on_submitted_work_done(move || fence.complete(value));
        Ok(())
    }

    fn completed_value(&mut self) -> Result<u64, SyncError> {
        self.device
            .poll(wgpu::PollType::Poll)
            .map_err(|e| SyncError::Read { source: e.into() })?;

        let completed = self.fence.completed();
        self.ledger.retire(completed);
        Ok(completed)
    }

    fn wait_until(&mut self, target: u64) -> Result<(), SyncError> {
        let submission = match self.ledger.wait_plan(target, self.fence.completed())? {
            WaitPlan::Done => return Ok(()),
            WaitPlan::Poll(submission) => submission,
        };

        self.poll(
            wgpu::PollType::Wait {
                submission_index: submission,
                timeout: None,
            },
            target,
        )?;

        // Work-done callbacks run inside poll; one more pass picks up a
        // callback registered after the awaited submission.
        if self.fence.completed() < target {
            self.poll(wgpu::PollType::wait_indefinitely(), target)?;
        }

        let completed = self.fence.completed();
        self.ledger.retire(completed);

        if completed < target {
            return Err(SyncError::Wait {
                target,
                source: format!("device idle with fence at {completed}").into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameScheduler;

    #[test]
    fn signals_must_increase() {
        let mut ledger = SignalLedger::<u32>::new();
        ledger.signal(1).unwrap();
        ledger.signal(2).unwrap();

        assert!(matches!(
            ledger.signal(2),
            Err(SyncError::Signal { value: 2, .. })
        ));
        assert!(matches!(
            ledger.signal(1),
            Err(SyncError::Signal { value: 1, .. })
        ));
        assert_eq!(ledger.signaled, 2);
    }

    #[test]
    fn each_signal_covers_the_latest_submission_once() {
        let mut ledger = SignalLedger::new();
        ledger.submitted(10u32);
        ledger.signal(1).unwrap();
        ledger.signal(2).unwrap();

        let pending: Vec<_> = ledger.pending.iter().cloned().collect();
        assert_eq!(pending, vec![(1, Some(10)), (2, None)]);
    }

    #[test]
    fn retire_drops_completed_entries_only() {
        let mut ledger = SignalLedger::new();
        for (index, value) in [(7u32, 1), (8, 2), (9, 3)] {
            ledger.submitted(index);
            ledger.signal(value).unwrap();
        }

        ledger.retire(2);
        let left: Vec<u64> = ledger.pending.iter().map(|(v, _)| *v).collect();
        assert_eq!(left, vec![3]);

        ledger.retire(0);
        assert_eq!(ledger.pending.len(), 1);

        ledger.retire(3);
        assert!(ledger.pending.is_empty());
    }

    #[test]
    fn reached_target_needs_no_wait() {
        let ledger = SignalLedger::<u32>::new();
        assert_eq!(ledger.wait_plan(0, 0).unwrap(), WaitPlan::Done);

        let mut ledger = SignalLedger::<u32>::new();
        ledger.signal(1).unwrap();
        assert_eq!(ledger.wait_plan(1, 1).unwrap(), WaitPlan::Done);
    }

    #[test]
    fn unsignaled_target_is_rejected() {
        let mut ledger = SignalLedger::<u32>::new();
        ledger.signal(1).unwrap();

        assert!(matches!(
            ledger.wait_plan(2, 0),
            Err(SyncError::NeverSignaled {
                target: 2,
                signaled: 1
            })
        ));
    }

    #[test]
    fn wait_targets_the_covering_submission() {
        let mut ledger = SignalLedger::new();
        for (index, value) in [(7u32, 1), (8, 2), (9, 3)] {
            ledger.submitted(index);
            ledger.signal(value).unwrap();
        }

        assert_eq!(ledger.wait_plan(2, 0).unwrap(), WaitPlan::Poll(Some(8)));
        assert_eq!(ledger.wait_plan(3, 1).unwrap(), WaitPlan::Poll(Some(9)));
    }

    fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok()?;

        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()
    }

    #[test]
    fn fence_follows_real_submissions() {
        // Machines without any adapter skip the GPU round trip.
        let Some((device, queue)) = headless_device() else {
            return;
        };

        let backend = WgpuQueue::new(&device, &queue);
        let contexts = [WgpuContext::new(&device, 0), WgpuContext::new(&device, 1)];
        let mut scheduler = FrameScheduler::new(backend, contexts);

        for frame in 0..6u64 {
            let context = scheduler.begin_frame().unwrap();
            assert!(context.encoder_mut().is_some());

            let report = scheduler.end_frame().unwrap();
            assert_eq!(report.submitted, frame + 1);
            assert!(report.outstanding() <= 1);
        }

        scheduler.wait_idle().unwrap();
        assert_eq!(scheduler.queue().fence().completed(), 6);
        assert_eq!(scheduler.observed_completed(), 6);

        let mut backend = WgpuQueue::new(&device, &queue);
        assert!(matches!(
            backend.wait_until(1),
            Err(SyncError::NeverSignaled { target: 1, .. })
        ));
        let mut idle = WgpuContext::new(&device, 0);
        assert!(matches!(
            backend.execute(&mut idle),
            Err(SyncError::NothingRecorded)
        ));
    }
}
