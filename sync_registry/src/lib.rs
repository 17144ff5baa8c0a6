//! # Sync Registry
//!
//! Locks and wake-up signals shared between the scheduler and the
//! execution units it drives.
//!
//! ## Philosophy
//!
//! - One registry per simulation, passed explicitly (no process-wide state)
//! - Global lock outside, per-process lock inside
//! - Terminated processes leave no entries behind

pub mod lock;
pub mod registry;
pub mod signal;

pub use lock::{lock_shared, LockGuard, ReentrantLock};
pub use registry::SyncRegistry;
pub use signal::{SignalSlot, SignalWait};
