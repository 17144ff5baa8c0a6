//! # Simulated Kernel
//!
//! A single-CPU scheduler that runs simulated processes in discrete cycles.
//!
//! ## Purpose
//!
//! The simulated kernel lets scheduling and paging policies be compared
//! without hardware:
//! - Runs under `cargo test`
//! - Deterministic (cycle counter, no wall clock)
//! - Inspectable (queues, frames, timelines and audit logs are all public)
//!
//! ## Components
//!
//! - [`Scheduler`]: cycle loop, dispatch and preemption
//! - [`IoManager`]: timed I/O and page-fault operations
//! - [`ExecutionUnit`]: runs one unit of a process per signal
//! - [`SimulationReport`]: per-process and global metrics
//!
//! Memory comes from the `paging` crate and locking from `sync_registry`.
//!
//! ## Example
//!
//! ```
//! use paging::MemoryConfig;
//! use process_model::{Burst, Process};
//! use sim_kernel::{Scheduler, SchedulerConfig};
//!
//! let memory = MemoryConfig::default().build().unwrap();
//! let mut scheduler = Scheduler::new(SchedulerConfig::default(), memory).unwrap();
//! scheduler
//!     .add_process(Process::new("P1", 0, vec![Burst::cpu(3)], 1))
//!     .unwrap();
//!
//! while scheduler.run_one_unit() {}
//! assert_eq!(scheduler.report().process("P1").unwrap().finish_cycle, Some(3));
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod execution_unit;
pub mod io_manager;
pub mod report;
pub mod run_queue;
pub mod scheduler;
pub mod snapshot;

pub use clock::CycleClock;
pub use config::{SchedulerConfig, SchedulingAlgorithm};
pub use error::SchedulerError;
pub use events::{
    ExitReason, IoAuditLog, IoEvent, PreemptionReason, ScheduleAuditLog, ScheduleEvent,
};
pub use execution_unit::{ExecutionUnit, UnitOutcome};
pub use io_manager::{
    Completion, CompletionContext, CompletionOutcome, IoManager, OperationKind, OperationStatus,
    PendingOperation, PAGE_FAULT_CYCLES,
};
pub use report::{ProcessReport, SimulationReport};
pub use run_queue::RunQueue;
pub use scheduler::Scheduler;
pub use snapshot::{ExecutionSnapshot, Timeline, TimelineEntry, TimelineSegment};
