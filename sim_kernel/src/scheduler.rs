//! # Cycle Scheduler
//!
//! Drives the whole simulation one global cycle at a time.
//!
//! ## Philosophy
//!
//! - **Determinism first**: same processes + same configuration => same schedule.
//! - **One serialization point**: every state transition happens inside
//!   `run_one_unit`, under the global lock.
//! - **Faults are transitions, not errors**: a process that cannot get memory
//!   is blocked or terminated; the rest of the simulation carries on.
//!
//! ## Cycle
//!
//! Each call to [`Scheduler::run_one_unit`] performs, in order:
//!
//! 1. Admit arrived processes; start I/O bursts queued last cycle
//! 2. Finalize due I/O and fault operations
//! 3. Under SJF or PRIORITY, preempt for a strictly better ready process
//! 4. If the CPU is idle, dispatch (all pages must be made resident)
//! 5. Run one unit of the current process
//! 6. Charge a wait cycle to every ready process
//! 7. Advance the clock

use crate::clock::CycleClock;
use crate::config::{SchedulerConfig, SchedulingAlgorithm};
use crate::events::{ExitReason, PreemptionReason, ScheduleAuditLog, ScheduleEvent};
use crate::execution_unit::{ExecutionUnit, UnitOutcome};
use crate::io_manager::{CompletionContext, CompletionOutcome, IoManager};
use crate::report::SimulationReport;
use crate::run_queue::RunQueue;
use crate::snapshot::{ExecutionSnapshot, Timeline};
use crate::SchedulerError;
use core_types::ProcessId;
use paging::MemoryManager;
use process_model::{Burst, BurstResource, Process, ProcessState};
use std::collections::HashMap;
use std::sync::Arc;
use sync_registry::SyncRegistry;

/// Scheduler state lent to the completion manager for one cycle
struct CycleContext<'a> {
    processes: &'a mut HashMap<ProcessId, Process>,
    memory: &'a mut MemoryManager,
    ready: &'a mut RunQueue,
}

impl CompletionContext for CycleContext<'_> {
    fn process_mut(&mut self, pid: &ProcessId) -> Option<&mut Process> {
        self.processes.get_mut(pid)
    }

    fn load_page(&mut self, pid: &ProcessId, page: usize) -> bool {
        self.memory.load_page(pid, page)
    }

    fn ensure_resident(&mut self, pid: &ProcessId, pages: usize) -> bool {
        self.memory.ensure_resident(pid, pages)
    }

    fn make_ready(&mut self, pid: &ProcessId) {
        self.ready.push_back(pid.clone());
    }
}

/// Selection key under `algorithm`; smaller is better
fn selection_key(algorithm: SchedulingAlgorithm, process: &Process) -> Option<i64> {
    match algorithm {
        SchedulingAlgorithm::Priority => Some(i64::from(process.priority())),
        SchedulingAlgorithm::Sjf => process
            .remaining_in_current_burst()
            .map(|remaining| i64::try_from(remaining).unwrap_or(i64::MAX)),
        SchedulingAlgorithm::Fcfs | SchedulingAlgorithm::Rr => Some(0),
    }
}

/// Single-CPU scheduler
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    clock: CycleClock,
    registry: Arc<SyncRegistry>,
    memory: MemoryManager,
    io: IoManager,
    processes: HashMap<ProcessId, Process>,
    /// Registration order
    order: Vec<ProcessId>,
    units: HashMap<ProcessId, ExecutionUnit>,
    /// Registered processes whose arrival cycle has not come yet
    arrivals: Vec<ProcessId>,
    ready: RunQueue,
    current: Option<ProcessId>,
    quantum_used: u64,
    /// READY processes whose I/O burst starts next cycle
    delayed_io: Vec<ProcessId>,
    last_snapshot: Option<ExecutionSnapshot>,
    timeline: Timeline,
    shut_down: bool,
    audit_log: ScheduleAuditLog,
}

impl Scheduler {
    /// Creates a scheduler that owns `memory`
    pub fn new(config: SchedulerConfig, memory: MemoryManager) -> Result<Self, SchedulerError> {
        config.validate()?;
        let registry = Arc::new(SyncRegistry::new());

        Ok(Self {
            config,
            clock: CycleClock::new(),
            io: IoManager::new(Arc::clone(&registry)),
            registry,
            memory,
            processes: HashMap::new(),
            order: Vec::new(),
            units: HashMap::new(),
            arrivals: Vec::new(),
            ready: RunQueue::new(),
            current: None,
            quantum_used: 0,
            delayed_io: Vec::new(),
            last_snapshot: None,
            timeline: Timeline::new(),
            shut_down: false,
            audit_log: ScheduleAuditLog::new(),
        })
    }

    /// Changes the policy; takes effect from the next selection
    pub fn set_algorithm(&mut self, algorithm: SchedulingAlgorithm) {
        self.config.algorithm = algorithm;
    }

    /// Changes the round-robin quantum
    pub fn set_quantum(&mut self, quantum: u64) -> Result<(), SchedulerError> {
        if quantum == 0 {
            return Err(SchedulerError::ZeroQuantum);
        }
        self.config.quantum = quantum;
        Ok(())
    }

    /// Registers a NEW process
    ///
    /// A process without bursts is rejected. Its page table and execution
    /// unit are created immediately. It joins
    /// the ready queue now if its arrival cycle has passed, otherwise at
    /// the start of its arrival cycle.
    pub fn add_process(&mut self, mut process: Process) -> Result<(), SchedulerError> {
        if self.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        let pid = process.id().clone();
        if self.processes.contains_key(&pid) {
            return Err(SchedulerError::DuplicateProcess(pid));
        }
        if process.bursts().is_empty() {
            return Err(SchedulerError::EmptyProcess(pid));
        }

        let registry = Arc::clone(&self.registry);
        let _global = registry.global();
        let _lock = registry.process_lock(&pid);

        self.memory.create_process(&pid, process.pages());
        if let Some(references) = process.future_references() {
            self.memory.register_future_references(&pid, references);
        }
        self.units.insert(pid.clone(), ExecutionUnit::new(pid.clone()));

        let now = self.clock.current();
        let arrived = process.arrival() <= now;
        if arrived {
            process.set_state(ProcessState::Ready);
        }
        self.processes.insert(pid.clone(), process);
        self.order.push(pid.clone());

        if arrived {
            self.ready.push_back(pid.clone());
            self.audit_log.record(ScheduleEvent::ProcessAdmitted {
                pid,
                timestamp_cycle: now,
            });
        } else {
            self.arrivals.push(pid);
        }
        Ok(())
    }

    /// Advances the simulation by one cycle
    ///
    /// Returns whether work remains: ready, running, blocked on an
    /// in-flight operation, waiting to start I/O, or not yet arrived.
    pub fn run_one_unit(&mut self) -> bool {
        if self.shut_down {
            return false;
        }

        let registry = Arc::clone(&self.registry);
        let _global = registry.global();
        let now = self.clock.current();
        self.memory.set_cycle(now);
        self.last_snapshot = None;

        self.admit_arrivals(now);
        self.start_delayed_io(now);
        self.finalize_completed(now);
        self.check_preemption(now);
        if self.current.is_none() {
            self.dispatch(now);
        }

        let executed = self.execute_current(now);
        if executed.is_none() {
            self.audit_log.record(ScheduleEvent::CpuIdle {
                timestamp_cycle: now,
            });
        }
        self.timeline.record(now, executed);

        self.account_wait();
        self.clock.tick();
        self.has_work()
    }

    fn admit_arrivals(&mut self, now: u64) {
        let processes = &self.processes;
        let mut due: Vec<ProcessId> = Vec::new();
        self.arrivals.retain(|pid| {
            let arrived = processes.get(pid).map_or(true, |p| p.arrival() <= now);
            if arrived {
                due.push(pid.clone());
            }
            !arrived
        });
        due.sort_by_key(|pid| processes.get(pid).map_or(0, Process::arrival));

        let registry = Arc::clone(&self.registry);
        for pid in due {
            let _lock = registry.process_lock(&pid);
            let Some(process) = self.processes.get_mut(&pid) else {
                continue;
            };
            process.set_state(ProcessState::Ready);
            self.ready.push_back(pid.clone());
            self.audit_log.record(ScheduleEvent::ProcessAdmitted {
                pid,
                timestamp_cycle: now,
            });
        }
    }

    fn start_delayed_io(&mut self, now: u64) {
        let registry = Arc::clone(&self.registry);
        for pid in std::mem::take(&mut self.delayed_io) {
            let _lock = registry.process_lock(&pid);
            let Some(process) = self.processes.get_mut(&pid) else {
                continue;
            };
            if process.state() != ProcessState::Ready {
                continue;
            }
            let Some(duration) = process
                .current_burst()
                .filter(|burst| burst.resource() == BurstResource::Io)
                .map(Burst::total)
            else {
                continue;
            };

            if self.io.start_io(&pid, duration, now).is_some() {
                process.set_state(ProcessState::BlockedIo);
                self.audit_log.record(ScheduleEvent::IoStarted {
                    pid,
                    duration,
                    timestamp_cycle: now,
                });
            } else {
                self.delayed_io.push(pid);
            }
        }
    }

    fn finalize_completed(&mut self, now: u64) {
        let completions = {
            let mut ctx = CycleContext {
                processes: &mut self.processes,
                memory: &mut self.memory,
                ready: &mut self.ready,
            };
            self.io.process_completed(now, &mut ctx)
        };

        for completion in completions {
            let pid = completion.operation.pid().clone();
            if completion.outcome == CompletionOutcome::Orphaned {
                continue;
            }
            self.audit_log.record(ScheduleEvent::OperationCompleted {
                pid: pid.clone(),
                kind: completion.operation.kind(),
                timestamp_cycle: now,
            });

            match completion.outcome {
                CompletionOutcome::Ready | CompletionOutcome::Orphaned => {}
                CompletionOutcome::NextIo => self.schedule_io(pid, now),
                CompletionOutcome::Finished => {
                    self.finish_process(&pid, Some(now), ExitReason::Normal, now)
                }
                CompletionOutcome::Failed => {
                    self.finish_process(&pid, None, ExitReason::MemoryExhausted, now)
                }
            }
        }
    }

    fn check_preemption(&mut self, now: u64) {
        let algorithm = self.config.algorithm;
        if !algorithm.is_preemptive() {
            return;
        }
        let Some(current) = self.current.clone() else {
            return;
        };
        let Some(current_key) = self
            .processes
            .get(&current)
            .and_then(|p| selection_key(algorithm, p))
        else {
            return;
        };

        // A candidate that cannot be made resident is parked and the next
        // best one is tried
        let candidate = loop {
            let Some(candidate) = self.better_candidate(current_key) else {
                return;
            };
            self.ready.remove(&candidate);
            if self.make_resident(&candidate) {
                break candidate;
            }
            self.block_on_memory(&candidate, now);
        };

        let registry = Arc::clone(&self.registry);
        {
            let _lock = registry.process_lock(&current);
            if let Some(process) = self.processes.get_mut(&current) {
                process.set_state(ProcessState::Ready);
            }
            self.ready.push_front(current.clone());
        }
        self.audit_log.record(ScheduleEvent::ProcessPreempted {
            pid: current,
            reason: PreemptionReason::BetterCandidate {
                by: candidate.clone(),
            },
            timestamp_cycle: now,
        });
        self.start_running(&candidate, now);
    }

    /// First ready process strictly better than `current_key`
    fn better_candidate(&self, current_key: i64) -> Option<ProcessId> {
        let algorithm = self.config.algorithm;
        let key_of = |pid: &ProcessId| {
            self.processes
                .get(pid)
                .and_then(|p| selection_key(algorithm, p))
        };
        let candidate = self.ready.peek_first_min_by_key(key_of)?;
        // Ties keep the running process
        key_of(candidate)
            .filter(|&key| key < current_key)
            .map(|_| candidate.clone())
    }

    fn select_next(&mut self) -> Option<ProcessId> {
        let algorithm = self.config.algorithm;
        if algorithm.is_queue_order() {
            return self.ready.pop_front();
        }
        let processes = &self.processes;
        self.ready
            .take_first_min_by_key(|pid| processes.get(pid).and_then(|p| selection_key(algorithm, p)))
    }

    fn dispatch(&mut self, now: u64) {
        let Some(pid) = self.select_next() else {
            return;
        };
        if self.make_resident(&pid) {
            self.start_running(&pid, now);
        } else {
            self.block_on_memory(&pid, now);
        }
    }

    /// Makes every page of `pid` resident
    fn make_resident(&mut self, pid: &ProcessId) -> bool {
        let memory = &mut self.memory;
        match self.processes.get(pid) {
            Some(process) => memory.ensure_pages(process),
            None => false,
        }
    }

    fn start_running(&mut self, pid: &ProcessId, now: u64) {
        let registry = Arc::clone(&self.registry);
        let _lock = registry.process_lock(pid);
        if let Some(process) = self.processes.get_mut(pid) {
            process.set_state(ProcessState::Running);
            process.record_start(now);
        }
        self.current = Some(pid.clone());
        self.quantum_used = 0;
        self.audit_log.record(ScheduleEvent::ProcessDispatched {
            pid: pid.clone(),
            timestamp_cycle: now,
        });
    }

    /// Parks a READY process until a full load brings in all its pages
    fn block_on_memory(&mut self, pid: &ProcessId, now: u64) {
        let registry = Arc::clone(&self.registry);
        let _lock = registry.process_lock(pid);
        let Some(process) = self.processes.get_mut(pid) else {
            return;
        };
        process.set_state(ProcessState::BlockedMem);
        self.io.start_full_load(pid, process.pages(), now);
        self.audit_log.record(ScheduleEvent::BlockedOnMemory {
            pid: pid.clone(),
            page: None,
            timestamp_cycle: now,
        });
    }

    /// Parks the running process on a single missing page
    fn fault_current(&mut self, pid: &ProcessId, page: usize, now: u64) {
        let registry = Arc::clone(&self.registry);
        let _lock = registry.process_lock(pid);
        if let Some(process) = self.processes.get_mut(pid) {
            process.set_state(ProcessState::BlockedMem);
        }
        self.io.start_page_fault(pid, page, now);
        self.current = None;
        self.quantum_used = 0;
        self.audit_log.record(ScheduleEvent::BlockedOnMemory {
            pid: pid.clone(),
            page: Some(page),
            timestamp_cycle: now,
        });
    }

    /// Runs one unit of the current process, returning it if it executed
    fn execute_current(&mut self, now: u64) -> Option<ProcessId> {
        let pid = self.current.clone()?;
        let registry = Arc::clone(&self.registry);

        let reference = self
            .processes
            .get(&pid)
            .filter(|p| p.is_current_burst_cpu())
            .and_then(Process::next_page_reference);
        if let Some(page) = reference {
            if self.memory.is_page_loaded(&pid, page) {
                self.memory.load_page(&pid, page);
            } else {
                self.fault_current(&pid, page, now);
                return None;
            }
        }

        self.last_snapshot = self.processes.get(&pid).and_then(ExecutionSnapshot::capture);

        registry.signal(&pid);
        let outcome = match (self.units.get_mut(&pid), self.processes.get_mut(&pid)) {
            (Some(unit), Some(process)) => unit.run_signaled(process, &registry),
            _ => UnitOutcome::Stopped,
        };

        match outcome {
            UnitOutcome::StillRunning => {
                if self.config.algorithm == SchedulingAlgorithm::Rr {
                    self.quantum_used += 1;
                    if self.quantum_used >= self.config.quantum {
                        self.expire_quantum(&pid, now);
                    }
                }
                Some(pid)
            }
            UnitOutcome::BurstCompleted => {
                self.current = None;
                self.quantum_used = 0;
                self.after_burst(&pid, now);
                Some(pid)
            }
            UnitOutcome::AwaitingIo => {
                {
                    let _lock = registry.process_lock(&pid);
                    if let Some(process) = self.processes.get_mut(&pid) {
                        process.set_state(ProcessState::Ready);
                    }
                }
                self.current = None;
                self.quantum_used = 0;
                self.schedule_io(pid, now);
                None
            }
            UnitOutcome::PhaseComplete | UnitOutcome::NotSignaled | UnitOutcome::Stopped => {
                self.current = None;
                self.quantum_used = 0;
                None
            }
        }
    }

    fn expire_quantum(&mut self, pid: &ProcessId, now: u64) {
        let registry = Arc::clone(&self.registry);
        let _lock = registry.process_lock(pid);
        if let Some(process) = self.processes.get_mut(pid) {
            process.set_state(ProcessState::Ready);
        }
        self.ready.push_back(pid.clone());
        self.current = None;
        self.quantum_used = 0;
        self.audit_log.record(ScheduleEvent::ProcessPreempted {
            pid: pid.clone(),
            reason: PreemptionReason::QuantumExpired,
            timestamp_cycle: now,
        });
    }

    /// Routes a process whose CPU burst just ended
    fn after_burst(&mut self, pid: &ProcessId, now: u64) {
        let Some(process) = self.processes.get(pid) else {
            return;
        };
        if process.state() == ProcessState::Terminated {
            self.finish_process(pid, Some(now + 1), ExitReason::Normal, now);
        } else if process.is_current_burst_io() {
            self.schedule_io(pid.clone(), now);
        } else {
            self.ready.push_back(pid.clone());
        }
    }

    /// Queues the I/O burst of a READY process to start next cycle
    fn schedule_io(&mut self, pid: ProcessId, now: u64) {
        self.audit_log.record(ScheduleEvent::IoScheduled {
            pid: pid.clone(),
            timestamp_cycle: now,
        });
        self.delayed_io.push(pid);
    }

    /// Final bookkeeping for a TERMINATED process
    fn finish_process(
        &mut self,
        pid: &ProcessId,
        finish_cycle: Option<u64>,
        reason: ExitReason,
        now: u64,
    ) {
        let registry = Arc::clone(&self.registry);
        {
            let _lock = registry.process_lock(pid);
            if let (Some(process), Some(cycle)) = (self.processes.get_mut(pid), finish_cycle) {
                process.record_finish(cycle);
            }
            self.memory.release_process_memory(pid);
            if let Some(unit) = self.units.get_mut(pid) {
                unit.stop();
            }
            self.ready.remove(pid);
            self.delayed_io.retain(|queued| queued != pid);
            if self.current.as_ref() == Some(pid) {
                self.current = None;
                self.quantum_used = 0;
            }
        }
        registry.cleanup(pid);
        self.audit_log.record(ScheduleEvent::ProcessTerminated {
            pid: pid.clone(),
            reason,
            timestamp_cycle: now,
        });
    }

    fn account_wait(&mut self) {
        for pid in self.ready.iter() {
            if let Some(process) = self.processes.get_mut(pid) {
                if process.state() == ProcessState::Ready {
                    process.add_wait_cycle();
                }
            }
        }
    }

    /// Checks if anything is left to simulate
    pub fn has_work(&self) -> bool {
        !self.ready.is_empty()
            || self.current.is_some()
            || self.io.is_active()
            || !self.delayed_io.is_empty()
            || !self.arrivals.is_empty()
    }

    /// Stops the simulation
    ///
    /// Pending I/O and fault records are discarded, every execution unit
    /// is stopped and the registry refuses further signals. Returns the
    /// number of discarded records.
    pub fn shutdown(&mut self) -> usize {
        if self.shut_down {
            return 0;
        }
        let registry = Arc::clone(&self.registry);
        let _global = registry.global();

        self.shut_down = true;
        let dropped = self.io.shutdown(self.clock.current());
        for unit in self.units.values_mut() {
            unit.stop();
        }
        registry.shutdown();
        dropped
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn cycle(&self) -> u64 {
        self.clock.current()
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn algorithm(&self) -> SchedulingAlgorithm {
        self.config.algorithm
    }

    pub fn quantum(&self) -> u64 {
        self.config.quantum
    }

    /// CPU units the current process has used of its quantum
    pub fn quantum_used(&self) -> u64 {
        self.quantum_used
    }

    /// Ready queue contents, head first
    pub fn ready_queue(&self) -> Vec<ProcessId> {
        self.ready.iter().cloned().collect()
    }

    pub fn ready_processes(&self) -> Vec<&Process> {
        self.ready
            .iter()
            .filter_map(|pid| self.processes.get(pid))
            .collect()
    }

    /// The process holding the CPU, if it is RUNNING
    pub fn current_process(&self) -> Option<&Process> {
        self.current
            .as_ref()
            .and_then(|pid| self.processes.get(pid))
            .filter(|p| p.state() == ProcessState::Running)
    }

    pub fn process(&self, pid: &ProcessId) -> Option<&Process> {
        self.processes.get(pid)
    }

    /// Every registered process, in registration order
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.order.iter().filter_map(|pid| self.processes.get(pid))
    }

    /// Number of processes in state RUNNING
    pub fn running_count(&self) -> usize {
        self.processes
            .values()
            .filter(|p| p.state() == ProcessState::Running)
            .count()
    }

    pub fn all_terminated(&self) -> bool {
        self.processes
            .values()
            .all(|p| p.state() == ProcessState::Terminated)
    }

    /// Snapshot of the process that executed in the last cycle
    pub fn last_snapshot(&self) -> Option<&ExecutionSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn pending_arrivals(&self) -> &[ProcessId] {
        &self.arrivals
    }

    pub fn delayed_io(&self) -> &[ProcessId] {
        &self.delayed_io
    }

    pub fn execution_unit(&self, pid: &ProcessId) -> Option<&ExecutionUnit> {
        self.units.get(pid)
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn io_manager(&self) -> &IoManager {
        &self.io
    }

    pub fn registry(&self) -> &Arc<SyncRegistry> {
        &self.registry
    }

    pub fn audit_log(&self) -> &ScheduleAuditLog {
        &self.audit_log
    }

    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }

    /// Per-process and global metrics at this point of the run
    pub fn report(&self) -> SimulationReport {
        SimulationReport::from_scheduler(self)
    }
}
