//! Per-cycle observations for reporting

use core_types::ProcessId;
use process_model::{BurstResource, Process, ProcessState};
use serde::{Deserialize, Serialize};

/// The process about to execute in a cycle
///
/// Captured after dispatch and before the unit runs, so `remaining`
/// still includes the unit executed in that cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub pid: ProcessId,
    pub state: ProcessState,
    pub resource: BurstResource,
    pub remaining: u64,
    pub total: u64,
}

impl ExecutionSnapshot {
    /// Captures `process` if it is running an unfinished burst
    pub fn capture(process: &Process) -> Option<Self> {
        if process.state() != ProcessState::Running {
            return None;
        }
        let burst = process.current_burst()?;
        Some(Self {
            pid: process.id().clone(),
            state: process.state(),
            resource: burst.resource(),
            remaining: burst.remaining(),
            total: burst.total(),
        })
    }
}

/// Which process held the CPU in one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub cycle: u64,
    /// None for an idle cycle
    pub pid: Option<ProcessId>,
}

/// A run of consecutive cycles with the same occupant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub pid: Option<ProcessId>,
    pub start: u64,
    /// Exclusive
    pub end: u64,
}

/// CPU occupancy history, one entry per cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cycle: u64, pid: Option<ProcessId>) {
        self.entries.push(TimelineEntry { cycle, pid });
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapses consecutive cycles of the same occupant (Gantt bars)
    pub fn segments(&self) -> Vec<TimelineSegment> {
        let mut segments: Vec<TimelineSegment> = Vec::new();
        for entry in &self.entries {
            match segments.last_mut() {
                Some(last) if last.pid == entry.pid && last.end == entry.cycle => {
                    last.end = entry.cycle + 1;
                }
                _ => segments.push(TimelineSegment {
                    pid: entry.pid.clone(),
                    start: entry.cycle,
                    end: entry.cycle + 1,
                }),
            }
        }
        segments
    }

    /// Cycles in which `pid` executed
    pub fn cycles_of(&self, pid: &ProcessId) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|entry| entry.pid.as_ref() == Some(pid))
            .map(|entry| entry.cycle)
            .collect()
    }
}
