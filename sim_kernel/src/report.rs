//! End-of-run metrics

use crate::config::SchedulingAlgorithm;
use crate::scheduler::Scheduler;
use core_types::ProcessId;
use process_model::{Process, ProcessState};
use serde::{Deserialize, Serialize};

/// Metrics of one process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub pid: ProcessId,
    pub state: ProcessState,
    pub priority: i32,
    pub pages: usize,
    pub arrival: u64,
    pub start_cycle: Option<u64>,
    pub finish_cycle: Option<u64>,
    pub wait_cycles: u64,
    pub cpu_cycles: u64,
    pub turnaround: Option<u64>,
    pub page_faults: u64,
    pub replacements: u64,
}

impl ProcessReport {
    fn from_process(process: &Process, page_faults: u64, replacements: u64) -> Self {
        let metrics = process.metrics();
        Self {
            pid: process.id().clone(),
            state: process.state(),
            priority: process.priority(),
            pages: process.pages(),
            arrival: process.arrival(),
            start_cycle: metrics.start_cycle,
            finish_cycle: metrics.finish_cycle,
            wait_cycles: metrics.wait_cycles,
            cpu_cycles: metrics.cpu_cycles,
            turnaround: process.turnaround(),
            page_faults,
            replacements,
        }
    }

    /// Finished every burst (as opposed to being killed for memory)
    pub fn completed(&self) -> bool {
        self.finish_cycle.is_some()
    }
}

/// Whole-run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub algorithm: SchedulingAlgorithm,
    pub quantum: u64,
    pub replacement: String,
    pub total_frames: usize,
    pub total_cycles: u64,
    pub completed: usize,
    /// Mean wait over every process
    pub average_wait: f64,
    /// Mean turnaround over completed processes
    pub average_turnaround: f64,
    /// Percentage of cycles in which a CPU unit executed
    pub cpu_utilization: f64,
    pub total_page_faults: u64,
    pub total_replacements: u64,
    pub processes: Vec<ProcessReport>,
}

impl SimulationReport {
    pub fn from_scheduler(scheduler: &Scheduler) -> Self {
        let memory = scheduler.memory();
        let processes: Vec<ProcessReport> = scheduler
            .processes()
            .map(|p| {
                ProcessReport::from_process(p, memory.page_faults(p.id()), memory.replacements(p.id()))
            })
            .collect();

        let total_cycles = scheduler.cycle();
        let turnarounds: Vec<u64> = processes.iter().filter_map(|p| p.turnaround).collect();
        let cpu_total: u64 = processes.iter().map(|p| p.cpu_cycles).sum();
        let wait_total: u64 = processes.iter().map(|p| p.wait_cycles).sum();

        Self {
            algorithm: scheduler.algorithm(),
            quantum: scheduler.quantum(),
            replacement: memory.algorithm_name().to_string(),
            total_frames: memory.total_frames(),
            total_cycles,
            completed: processes.iter().filter(|p| p.completed()).count(),
            average_wait: mean(wait_total, processes.len()),
            average_turnaround: mean(turnarounds.iter().sum(), turnarounds.len()),
            cpu_utilization: if total_cycles == 0 {
                0.0
            } else {
                cpu_total as f64 * 100.0 / total_cycles as f64
            },
            total_page_faults: processes.iter().map(|p| p.page_faults).sum(),
            total_replacements: processes.iter().map(|p| p.replacements).sum(),
            processes,
        }
    }

    pub fn process(&self, pid: &str) -> Option<&ProcessReport> {
        self.processes.iter().find(|p| p.pid.as_str() == pid)
    }
}

fn mean(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
