//! Simulated process entity

use crate::{Burst, BurstResource, ProcessState};
use core_types::ProcessId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority value of a process that does not declare one
///
/// Lower values are more urgent, so an unset priority outranks every
/// declared non-negative priority.
pub const UNSET_PRIORITY: i32 = -1;

/// Per-process accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    /// Cycle of first dispatch
    pub start_cycle: Option<u64>,
    /// Cycle boundary at which the last burst completed
    pub finish_cycle: Option<u64>,
    /// Cycles spent in the ready queue
    pub wait_cycles: u64,
    /// CPU units executed
    pub cpu_cycles: u64,
}

/// One simulated program
///
/// A process walks through its bursts in order. The scheduler owns every
/// process exclusively; all mutation happens through `&mut` access taken
/// under the process's lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    id: ProcessId,
    arrival: u64,
    bursts: Vec<Burst>,
    pages: usize,
    priority: i32,
    burst_index: usize,
    state: ProcessState,
    metrics: ProcessMetrics,
    /// Declared page-reference string, one entry per CPU unit
    future_references: Option<Vec<usize>>,
}

impl Process {
    /// Creates a process in state NEW with no declared priority
    pub fn new(id: impl Into<ProcessId>, arrival: u64, bursts: Vec<Burst>, pages: usize) -> Self {
        Self {
            id: id.into(),
            arrival,
            bursts,
            pages,
            priority: UNSET_PRIORITY,
            burst_index: 0,
            state: ProcessState::New,
            metrics: ProcessMetrics::default(),
            future_references: None,
        }
    }

    /// Sets the scheduling priority (lower is more urgent)
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Attaches a future page-reference sequence
    pub fn with_future_references(mut self, references: Vec<usize>) -> Self {
        self.future_references = Some(references);
        self
    }

    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    pub fn arrival(&self) -> u64 {
        self.arrival
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn burst_index(&self) -> usize {
        self.burst_index
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn metrics(&self) -> &ProcessMetrics {
        &self.metrics
    }

    pub fn future_references(&self) -> Option<&[usize]> {
        self.future_references.as_deref()
    }

    /// Moves the process to `state`
    ///
    /// Illegal transitions are a scheduler bug, caught in debug builds.
    pub fn set_state(&mut self, state: ProcessState) {
        debug_assert!(
            self.state.can_transition_to(state),
            "illegal transition for {}: {} -> {}",
            self.id,
            self.state,
            state
        );
        self.state = state;
    }

    /// Returns the active burst, or None once every burst is consumed
    pub fn current_burst(&self) -> Option<&Burst> {
        self.bursts.get(self.burst_index)
    }

    pub fn current_burst_mut(&mut self) -> Option<&mut Burst> {
        self.bursts.get_mut(self.burst_index)
    }

    pub fn current_resource(&self) -> Option<BurstResource> {
        self.current_burst().map(Burst::resource)
    }

    /// Remaining time of the active burst (shortest-job key)
    pub fn remaining_in_current_burst(&self) -> Option<u64> {
        self.current_burst().map(Burst::remaining)
    }

    pub fn is_current_burst_cpu(&self) -> bool {
        self.current_resource() == Some(BurstResource::Cpu)
    }

    pub fn is_current_burst_io(&self) -> bool {
        self.current_resource() == Some(BurstResource::Io)
    }

    pub fn is_finished(&self) -> bool {
        self.burst_index >= self.bursts.len()
    }

    /// Moves to the next burst
    ///
    /// The process becomes TERMINATED when no burst is left and READY
    /// otherwise; the scheduler decides where a READY process goes next.
    pub fn advance_burst(&mut self) {
        if !self.is_finished() {
            self.burst_index += 1;
        }
        if self.is_finished() {
            self.set_state(ProcessState::Terminated);
        } else {
            self.set_state(ProcessState::Ready);
        }
    }

    /// Records the first dispatch; later calls are ignored
    pub fn record_start(&mut self, cycle: u64) {
        if self.metrics.start_cycle.is_none() {
            self.metrics.start_cycle = Some(cycle);
        }
    }

    pub fn record_finish(&mut self, cycle: u64) {
        self.metrics.finish_cycle = Some(cycle);
    }

    pub fn add_wait_cycle(&mut self) {
        self.metrics.wait_cycles += 1;
    }

    pub fn add_cpu_cycle(&mut self) {
        self.metrics.cpu_cycles += 1;
    }

    /// Finish minus arrival, once finished
    pub fn turnaround(&self) -> Option<u64> {
        self.metrics
            .finish_cycle
            .map(|finish| finish.saturating_sub(self.arrival))
    }

    /// Page the next CPU unit touches
    ///
    /// CPU unit `k` touches entry `k` of the declared reference sequence
    /// while that entry exists and is a valid page; otherwise the pages
    /// are swept in order of CPU usage.
    pub fn next_page_reference(&self) -> Option<usize> {
        if self.pages == 0 {
            return None;
        }
        let executed = self.metrics.cpu_cycles;
        let declared = self
            .future_references
            .as_ref()
            .and_then(|seq| usize::try_from(executed).ok().and_then(|k| seq.get(k)))
            .copied()
            .filter(|&page| page < self.pages);

        Some(declared.unwrap_or((executed % self.pages as u64) as usize))
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bursts: Vec<String> = self.bursts.iter().map(|b| b.to_string()).collect();
        write!(
            f,
            "{} arrival={} bursts={} priority={} pages={} state={}",
            self.id,
            self.arrival,
            bursts.join(","),
            self.priority,
            self.pages,
            self.state
        )
    }
}
