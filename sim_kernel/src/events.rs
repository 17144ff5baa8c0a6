//! Scheduler and I/O audit events

use crate::io_manager::OperationKind;
use core_types::{AuditLog, OperationId, ProcessId};
use serde::{Deserialize, Serialize};

/// Scheduling event for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    /// Process entered the ready queue for the first time
    ProcessAdmitted {
        pid: ProcessId,
        timestamp_cycle: u64,
    },
    /// Process was given the CPU
    ProcessDispatched {
        pid: ProcessId,
        timestamp_cycle: u64,
    },
    /// Process was taken off the CPU while still runnable
    ProcessPreempted {
        pid: ProcessId,
        reason: PreemptionReason,
        timestamp_cycle: u64,
    },
    /// I/O burst queued to start on the next cycle
    IoScheduled {
        pid: ProcessId,
        timestamp_cycle: u64,
    },
    /// I/O burst started counting down
    IoStarted {
        pid: ProcessId,
        duration: u64,
        timestamp_cycle: u64,
    },
    /// Process parked until its pages are loaded
    ///
    /// `page` is set for a single-page fault and None for a full load.
    BlockedOnMemory {
        pid: ProcessId,
        page: Option<usize>,
        timestamp_cycle: u64,
    },
    /// An I/O or fault operation of the process finished
    OperationCompleted {
        pid: ProcessId,
        kind: OperationKind,
        timestamp_cycle: u64,
    },
    /// Process reached TERMINATED
    ProcessTerminated {
        pid: ProcessId,
        reason: ExitReason,
        timestamp_cycle: u64,
    },
    /// No process executed this cycle
    CpuIdle {
        timestamp_cycle: u64,
    },
}

/// Reason for preemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreemptionReason {
    /// Round-robin time slice used up
    QuantumExpired,
    /// A strictly better ready process took the CPU
    BetterCandidate { by: ProcessId },
}

/// Reason for process exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Every burst completed
    Normal,
    /// A page could never be made resident
    MemoryExhausted,
}

/// Completion manager event for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoEvent {
    /// Operation recorded and counting down
    Registered {
        operation: OperationId,
        pid: ProcessId,
        kind: OperationKind,
        duration: u64,
        available_cycle: u64,
        timestamp_cycle: u64,
    },
    /// Operation finished and the process moved on
    Completed {
        operation: OperationId,
        pid: ProcessId,
        kind: OperationKind,
        timestamp_cycle: u64,
    },
    /// Operation finished but its pages could not be loaded
    Failed {
        operation: OperationId,
        pid: ProcessId,
        kind: OperationKind,
        timestamp_cycle: u64,
    },
    /// Second I/O for a process that already has one in flight
    DuplicateRejected {
        pid: ProcessId,
        timestamp_cycle: u64,
    },
    /// Operation discarded at shutdown
    Discarded {
        operation: OperationId,
        pid: ProcessId,
        timestamp_cycle: u64,
    },
}

pub type ScheduleAuditLog = AuditLog<ScheduleEvent>;
pub type IoAuditLog = AuditLog<IoEvent>;
