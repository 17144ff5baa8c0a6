//! Memory audit events

use core_types::{AuditLog, FrameId, ProcessId};
use serde::{Deserialize, Serialize};

/// Everything the memory manager did, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryEvent {
    /// Requested page was already resident
    PageHit {
        pid: ProcessId,
        page: usize,
        timestamp_cycle: u64,
    },
    /// Requested page was absent
    PageFault {
        pid: ProcessId,
        page: usize,
        timestamp_cycle: u64,
    },
    /// Page placed in a frame
    PageLoaded {
        pid: ProcessId,
        page: usize,
        frame: FrameId,
        timestamp_cycle: u64,
    },
    /// Page of `victim` evicted to serve `requester`
    PageEvicted {
        victim: ProcessId,
        page: usize,
        frame: FrameId,
        requester: ProcessId,
        timestamp_cycle: u64,
    },
    /// No frame could be freed for the fault
    VictimNotFound {
        pid: ProcessId,
        page: usize,
        timestamp_cycle: u64,
    },
    /// All frames of a process returned to the free pool
    ProcessReleased {
        pid: ProcessId,
        frames_freed: usize,
        timestamp_cycle: u64,
    },
}

pub type MemoryAuditLog = AuditLog<MemoryEvent>;
