//! Per-process wake-up signals

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Result of waiting on a signal slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalWait {
    /// A signal was consumed
    Signaled,
    /// The slot was closed (process cleanup or registry shutdown)
    Closed,
    /// No signal arrived within the timeout
    TimedOut,
}

#[derive(Debug, Default)]
struct SlotState {
    pending: usize,
    closed: bool,
}

/// Counting wake-up slot for one execution unit
///
/// Signals are counted rather than latched, so a signal sent before the
/// unit starts waiting is not lost.
#[derive(Debug, Default)]
pub struct SignalSlot {
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl SignalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock()
    }

    /// Posts one signal; ignored once closed
    pub fn signal(&self) {
        let mut state = self.state();
        if state.closed {
            return;
        }
        state.pending += 1;
        self.changed.notify_all();
    }

    /// Consumes a pending signal without blocking
    pub fn try_take(&self) -> bool {
        let mut state = self.state();
        if state.closed || state.pending == 0 {
            return false;
        }
        state.pending -= 1;
        true
    }

    /// Blocks until a signal arrives, the slot closes, or `timeout` passes
    pub fn wait(&self, timeout: Duration) -> SignalWait {
        let mut state = self.state();
        let result = self
            .changed
            .wait_while_for(&mut state, |s| s.pending == 0 && !s.closed, timeout);

        if state.closed {
            SignalWait::Closed
        } else if state.pending > 0 {
            state.pending -= 1;
            SignalWait::Signaled
        } else {
            debug_assert!(result.timed_out());
            SignalWait::TimedOut
        }
    }

    /// Wakes every waiter and rejects further signals
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.pending = 0;
        self.changed.notify_all();
    }

    pub fn pending(&self) -> usize {
        self.state().pending
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_signals_are_counted() {
        let slot = SignalSlot::new();
        slot.signal();
        slot.signal();
        assert_eq!(slot.pending(), 2);

        assert!(slot.try_take());
        assert!(slot.try_take());
        assert!(!slot.try_take());
    }

    #[test]
    fn test_wait_times_out_without_signal() {
        let slot = SignalSlot::new();
        assert_eq!(slot.wait(Duration::from_millis(5)), SignalWait::TimedOut);
    }

    #[test]
    fn test_wait_consumes_signal_sent_before_waiting() {
        let slot = SignalSlot::new();
        slot.signal();
        assert_eq!(slot.wait(Duration::from_millis(5)), SignalWait::Signaled);
        assert_eq!(slot.pending(), 0);
    }

    #[test]
    fn test_wait_wakes_on_signal_from_other_thread() {
        let slot = Arc::new(SignalSlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait(Duration::from_secs(5)))
        };

        slot.signal();
        assert_eq!(waiter.join().unwrap(), SignalWait::Signaled);
    }

    #[test]
    fn test_close_wakes_waiters_and_drops_signals() {
        let slot = Arc::new(SignalSlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait(Duration::from_secs(5)))
        };

        slot.close();
        assert_eq!(waiter.join().unwrap(), SignalWait::Closed);

        slot.signal();
        assert!(!slot.try_take());
        assert!(slot.is_closed());
    }
}
