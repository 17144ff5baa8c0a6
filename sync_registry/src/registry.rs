//! Lock and signal registry for one simulation

use crate::lock::{lock_shared, LockGuard, ReentrantLock};
use crate::signal::{SignalSlot, SignalWait};
use core_types::ProcessId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;

/// Synchronization state shared by the scheduler and its execution units
///
/// One registry exists per simulation; it is created by the scheduler and
/// handed out as `Arc<SyncRegistry>`. There is no global instance.
///
/// ## Lock discipline
///
/// The global lock is always taken outside a per-process lock, never the
/// reverse. Debug builds assert this on every global acquisition.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    global: Arc<ReentrantLock>,
    process_locks: Mutex<HashMap<ProcessId, Arc<ReentrantLock>>>,
    signals: Mutex<HashMap<ProcessId, Arc<SignalSlot>>>,
    shut_down: AtomicBool,
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<ProcessId, Arc<ReentrantLock>>> {
        self.process_locks.lock()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ProcessId, Arc<SignalSlot>>> {
        self.signals.lock()
    }

    fn slot(&self, pid: &ProcessId) -> Arc<SignalSlot> {
        let mut slots = self.slots();
        let slot = slots
            .entry(pid.clone())
            .or_insert_with(|| Arc::new(SignalSlot::new()));
        if self.is_shut_down() {
            slot.close();
        }
        Arc::clone(slot)
    }

    /// Takes the global lock guarding the ready queue and dispatch
    pub fn global(&self) -> LockGuard {
        if !self.global.is_owned_by_current_thread() {
            debug_assert!(
                !self.holds_any_process_lock(),
                "global lock requested while holding a process lock"
            );
        }
        lock_shared(&self.global)
    }

    /// Takes the lock of `pid`, creating it on first use
    pub fn process_lock(&self, pid: &ProcessId) -> LockGuard {
        let lock = {
            let mut locks = self.locks();
            Arc::clone(
                locks
                    .entry(pid.clone())
                    .or_insert_with(|| Arc::new(ReentrantLock::new(()))),
            )
        };
        lock_shared(&lock)
    }

    /// Checks if the calling thread holds any per-process lock
    pub fn holds_any_process_lock(&self) -> bool {
        self.locks()
            .values()
            .any(|lock| lock.is_owned_by_current_thread())
    }

    /// Posts one run signal to the execution unit of `pid`
    pub fn signal(&self, pid: &ProcessId) {
        self.slot(pid).signal();
    }

    /// Consumes a pending run signal for `pid` without blocking
    pub fn take_signal(&self, pid: &ProcessId) -> bool {
        let slot = self.slots().get(pid).cloned();
        slot.is_some_and(|slot| slot.try_take())
    }

    /// Blocks until `pid` is signaled, its slot closes, or `timeout` passes
    pub fn wait_for_signal(&self, pid: &ProcessId, timeout: Duration) -> SignalWait {
        self.slot(pid).wait(timeout)
    }

    /// Number of signals waiting to be consumed by `pid`
    pub fn pending_signals(&self, pid: &ProcessId) -> usize {
        self.slots().get(pid).map_or(0, |slot| slot.pending())
    }

    /// Discards the lock and signal slot of a terminated process
    ///
    /// Waiters on the slot are woken with [`SignalWait::Closed`].
    pub fn cleanup(&self, pid: &ProcessId) {
        self.locks().remove(pid);
        if let Some(slot) = self.slots().remove(pid) {
            slot.close();
        }
    }

    /// Closes every signal slot and refuses new signals
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        for slot in self.slots().values() {
            slot.close();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Checks if any lock or signal entry exists for `pid`
    pub fn has_entries(&self, pid: &ProcessId) -> bool {
        self.locks().contains_key(pid) || self.slots().contains_key(pid)
    }

    /// Number of processes with a lock or signal entry
    pub fn tracked_processes(&self) -> usize {
        let locks = self.locks();
        let slots = self.slots();
        let mut count = locks.len();
        count += slots.keys().filter(|pid| !locks.contains_key(*pid)).count();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn pid(name: &str) -> ProcessId {
        ProcessId::from(name)
    }

    #[test]
    fn test_process_lock_created_on_first_use() {
        let registry = SyncRegistry::new();
        assert!(!registry.has_entries(&pid("P1")));

        let guard = registry.process_lock(&pid("P1"));
        assert!(registry.has_entries(&pid("P1")));
        assert!(registry.holds_any_process_lock());
        drop(guard);
        assert!(!registry.holds_any_process_lock());
    }

    #[test]
    fn test_global_then_process_nesting() {
        let registry = SyncRegistry::new();
        let _global = registry.global();
        let _p1 = registry.process_lock(&pid("P1"));
        let _p1_again = registry.process_lock(&pid("P1"));
        // Reentering the global lock while it is already held is allowed
        let _global_again = registry.global();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "global lock requested while holding a process lock")]
    fn test_inverted_lock_order_is_rejected() {
        let registry = SyncRegistry::new();
        let _p1 = registry.process_lock(&pid("P1"));
        let _global = registry.global();
    }

    #[test]
    fn test_signal_and_take() {
        let registry = SyncRegistry::new();
        assert!(!registry.take_signal(&pid("P1")));

        registry.signal(&pid("P1"));
        assert_eq!(registry.pending_signals(&pid("P1")), 1);
        assert!(registry.take_signal(&pid("P1")));
        assert!(!registry.take_signal(&pid("P1")));
    }

    #[test]
    fn test_signals_are_per_process() {
        let registry = SyncRegistry::new();
        registry.signal(&pid("P1"));
        assert!(!registry.take_signal(&pid("P2")));
        assert!(registry.take_signal(&pid("P1")));
    }

    #[test]
    fn test_cleanup_discards_entries_and_wakes_waiter() {
        let registry = Arc::new(SyncRegistry::new());
        registry.signal(&pid("P1"));
        assert!(registry.take_signal(&pid("P1")));

        let waiter = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.wait_for_signal(&pid("P1"), Duration::from_secs(5)))
        };
        // Give the waiter a chance to park; a closed slot is reported either way
        thread::sleep(Duration::from_millis(10));
        registry.cleanup(&pid("P1"));

        let result = waiter.join().unwrap();
        assert!(matches!(result, SignalWait::Closed | SignalWait::TimedOut));
        assert!(!registry.has_entries(&pid("P1")));
    }

    #[test]
    fn test_shutdown_closes_all_slots() {
        let registry = SyncRegistry::new();
        registry.signal(&pid("P1"));
        registry.signal(&pid("P2"));

        registry.shutdown();
        assert!(registry.is_shut_down());
        assert!(!registry.take_signal(&pid("P1")));

        // Slots created after shutdown start closed
        registry.signal(&pid("P3"));
        assert_eq!(
            registry.wait_for_signal(&pid("P3"), Duration::from_millis(5)),
            SignalWait::Closed
        );
    }

    #[test]
    fn test_tracked_processes() {
        let registry = SyncRegistry::new();
        let _a = registry.process_lock(&pid("P1"));
        registry.signal(&pid("P1"));
        registry.signal(&pid("P2"));
        assert_eq!(registry.tracked_processes(), 2);
    }
}
