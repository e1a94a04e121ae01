use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Monotonic completion counter with a blocking "wait until >= target".
///
/// Clones share the same counter. The producer side (a GPU completion callback
/// or a test double) calls [`CpuFence::complete`]; the consumer side reads
/// [`CpuFence::completed`] or blocks in [`CpuFence::wait_for`].
#[derive(Debug, Clone, Default)]
pub struct CpuFence {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    value: Mutex<u64>,
    cond: Condvar,
}

impl CpuFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the highest value completed so far.
    pub fn completed(&self) -> u64 {
        *self.lock()
    }

    /// Advances the counter to `value`.
    ///
    /// Values below the current one are ignored; the counter never moves back.
    pub fn complete(&self, value: u64) {
        let mut current = self.lock();
        if value > *current {
            *current = value;
            self.inner.cond.notify_all();
        }
    }

    /// Blocks the calling thread until the counter reaches `target`.
    ///
    /// Returns immediately if it already has. There is no timeout.
    pub fn wait_for(&self, target: u64) {
        let mut current = self.lock();
        while *current < target {
            current = match self.inner.cond.wait(current) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        // The guarded value is a plain integer, so a poisoned lock still holds
        // a consistent counter.
        match self.inner.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn starts_at_zero() {
        assert_eq!(CpuFence::new().completed(), 0);
    }

    #[test]
    fn complete_is_monotonic() {
        let fence = CpuFence::new();
        fence.complete(5);
        fence.complete(3);
        assert_eq!(fence.completed(), 5);
    }

    #[test]
    fn clones_share_the_counter() {
        let a = CpuFence::new();
        let b = a.clone();
        b.complete(7);
        assert_eq!(a.completed(), 7);
    }

    #[test]
    fn wait_for_reached_value_returns_immediately() {
        let fence = CpuFence::new();
        fence.complete(2);
        fence.wait_for(1);
        fence.wait_for(2);
    }

    #[test]
    fn wait_for_wakes_when_another_thread_completes() {
        let fence = CpuFence::new();
        let producer = fence.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.complete(1);
            thread::sleep(Duration::from_millis(20));
            producer.complete(3);
        });

        fence.wait_for(3);
        assert!(fence.completed() >= 3);
        handle.join().unwrap();
    }
}
