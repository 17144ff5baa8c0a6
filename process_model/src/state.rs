//! Process lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a simulated process
///
/// The legal transitions are:
///
/// ```text
/// NEW -> READY -> RUNNING -> { READY, BLOCKED_IO, BLOCKED_MEM, TERMINATED }
/// READY -> { BLOCKED_IO, BLOCKED_MEM }
/// BLOCKED_IO | BLOCKED_MEM -> { READY, TERMINATED }
/// ```
///
/// `Terminated` has no successor. A blocked process is never in the ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessState {
    /// Defined but not yet arrived
    New,
    /// Eligible for dispatch
    Ready,
    /// Holds the CPU
    Running,
    /// Waiting for an I/O burst to complete
    BlockedIo,
    /// Waiting for its pages to be loaded
    BlockedMem,
    /// All bursts consumed, or killed by an unrecoverable fault
    Terminated,
}

impl ProcessState {
    /// Checks if the process can never run again
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Terminated)
    }

    /// Checks if the process is waiting on I/O or memory
    pub fn is_blocked(&self) -> bool {
        matches!(self, ProcessState::BlockedIo | ProcessState::BlockedMem)
    }

    /// Checks if `next` is a legal successor of this state
    ///
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(&self, next: ProcessState) -> bool {
        use ProcessState::*;

        if *self == next {
            return true;
        }

        matches!(
            (*self, next),
            (New, Ready)
                | (Ready, Running)
                | (Ready, BlockedIo)
                | (Ready, BlockedMem)
                | (Running, Ready)
                | (Running, BlockedIo)
                | (Running, BlockedMem)
                | (Running, Terminated)
                | (BlockedIo, Ready)
                | (BlockedIo, Terminated)
                | (BlockedMem, Ready)
                | (BlockedMem, Terminated)
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::BlockedIo => "BLOCKED_IO",
            ProcessState::BlockedMem => "BLOCKED_MEM",
            ProcessState::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}
