//! Per-process execution unit
//!
//! Each process is driven by one unit that does nothing until the
//! scheduler signals it, then executes exactly one burst unit under the
//! process's lock. The unit is a plain state machine called synchronously
//! from the scheduler's cycle; no thread is parked behind it.

use core_types::ProcessId;
use process_model::{BurstResource, Process};
use sync_registry::SyncRegistry;

/// Result of driving a unit once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// CPU unit consumed, burst not finished
    StillRunning,
    /// CPU unit consumed and the burst is now exhausted
    BurstCompleted,
    /// Current burst is I/O; the scheduler must start it
    AwaitingIo,
    /// Process is blocked or terminated; nothing to run
    PhaseComplete,
    /// No pending signal
    NotSignaled,
    /// Unit was stopped
    Stopped,
}

/// Driver of one simulated process
#[derive(Debug, Clone)]
pub struct ExecutionUnit {
    pid: ProcessId,
    stopped: bool,
    units_executed: u64,
}

impl ExecutionUnit {
    pub fn new(pid: ProcessId) -> Self {
        Self {
            pid,
            stopped: false,
            units_executed: 0,
        }
    }

    pub fn pid(&self) -> &ProcessId {
        &self.pid
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// CPU units executed by this unit
    pub fn units_executed(&self) -> u64 {
        self.units_executed
    }

    /// Stops the unit; later signals are ignored
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Consumes one pending signal and runs one unit of `process`
    pub fn run_signaled(&mut self, process: &mut Process, registry: &SyncRegistry) -> UnitOutcome {
        if self.stopped {
            return UnitOutcome::Stopped;
        }
        if !registry.take_signal(&self.pid) {
            return UnitOutcome::NotSignaled;
        }

        let _lock = registry.process_lock(&self.pid);
        self.execute_unit(process)
    }

    fn execute_unit(&mut self, process: &mut Process) -> UnitOutcome {
        debug_assert_eq!(process.id(), &self.pid);
        let state = process.state();
        if state.is_blocked() || state.is_terminal() {
            return UnitOutcome::PhaseComplete;
        }

        match process.current_resource() {
            None => UnitOutcome::PhaseComplete,
            Some(BurstResource::Io) => UnitOutcome::AwaitingIo,
            Some(BurstResource::Cpu) => {
                let finished = match process.current_burst_mut() {
                    Some(burst) => {
                        burst.consume_unit();
                        burst.is_finished()
                    }
                    None => return UnitOutcome::PhaseComplete,
                };
                process.add_cpu_cycle();
                self.units_executed += 1;

                if finished {
                    process.advance_burst();
                    UnitOutcome::BurstCompleted
                } else {
                    UnitOutcome::StillRunning
                }
            }
        }
    }
}
