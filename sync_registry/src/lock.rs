//! Reentrant mutual exclusion
//!
//! Scheduler helpers nest per-process critical sections (a dispatch step
//! that also re-enqueues, a completion that also releases memory), so the
//! registry hands out locks the owning thread may take again.

use parking_lot::lock_api::ArcReentrantMutexGuard;
use parking_lot::{RawMutex, RawThreadId, ReentrantMutex};
use std::sync::Arc;

/// A lock that the owning thread may acquire repeatedly
pub type ReentrantLock = ReentrantMutex<()>;

/// Owned guard of a [`ReentrantLock`]
///
/// The guard holds a reference to the lock, so it stays valid even if the
/// registry discards the entry while the guard is alive.
pub type LockGuard = ArcReentrantMutexGuard<RawMutex, RawThreadId, ()>;

/// Locks `lock` until the returned guard is dropped
#[must_use = "the lock is released as soon as the guard is dropped"]
pub fn lock_shared(lock: &Arc<ReentrantLock>) -> LockGuard {
    lock.lock_arc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_reentrant_acquire() {
        let lock = Arc::new(ReentrantLock::new(()));

        let outer = lock_shared(&lock);
        let inner = lock_shared(&lock);
        assert!(lock.is_owned_by_current_thread());

        drop(inner);
        assert!(lock.is_locked());
        drop(outer);
        assert!(!lock.is_locked());
        assert!(!lock.is_owned_by_current_thread());
    }

    #[test]
    fn test_guard_outlives_registry_entry() {
        let lock = Arc::new(ReentrantLock::new(()));
        let guard = lock_shared(&lock);
        drop(lock);
        drop(guard);
    }

    #[test]
    fn test_excludes_other_threads() {
        let lock = Arc::new(ReentrantLock::new(()));
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let _guard = lock_shared(&lock);
                        // Non-atomic read-modify-write made safe by the lock
                        let value = counter.load(Ordering::Relaxed);
                        counter.store(value + 1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::Relaxed), 400);
        assert!(!lock.is_locked());
    }
}
