//! Scheduler configuration errors

use core_types::ProcessId;
use thiserror::Error;

/// Errors returned by scheduler configuration and registration
///
/// Nothing that happens inside a cycle is an error; process failures are
/// state transitions recorded in the audit log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Quantum must be positive")]
    ZeroQuantum,

    #[error("Process already registered: {0}")]
    DuplicateProcess(ProcessId),

    #[error("Process has no bursts: {0}")]
    EmptyProcess(ProcessId),

    #[error("Unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Scheduler has been shut down")]
    ShutDown,
}
