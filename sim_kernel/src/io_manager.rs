//! # I/O and Fault Completion Manager
//!
//! Tracks every in-flight asynchronous operation as a cycle-stamped record.
//!
//! ## Design
//!
//! No timers run in the background. An operation started at cycle `T`
//! with duration `N` becomes available at `T + N`, and the scheduler asks
//! for completions once per cycle. A record is due when
//! `current_cycle >= available_cycle`.
//!
//! Completing a record moves its process on: an I/O burst advances to the
//! next burst, a page fault loads its page, a full load makes every page
//! resident. The process then goes back to the ready queue, or is
//! terminated when its pages can never be loaded.

use crate::events::{IoAuditLog, IoEvent};
use core_types::{OperationId, ProcessId};
use process_model::{Process, ProcessState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sync_registry::SyncRegistry;

/// Cycles needed to bring in a single faulted page
pub const PAGE_FAULT_CYCLES: u64 = 1;

/// Kind of asynchronous operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// I/O burst of the process
    Io,
    /// One missing page
    PageFault { page: usize },
    /// Every page of the process
    FullLoad,
}

/// Progress of an operation at a given cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// No cycle consumed yet
    Waiting,
    InProgress,
    Complete,
}

/// One in-flight operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    id: OperationId,
    pid: ProcessId,
    kind: OperationKind,
    duration: u64,
    /// Cycle the duration is counted from
    start_cycle: u64,
    available_cycle: u64,
}

impl PendingOperation {
    fn new(pid: ProcessId, kind: OperationKind, duration: u64, start_cycle: u64) -> Self {
        Self {
            id: OperationId::new(),
            pid,
            kind,
            duration,
            start_cycle,
            available_cycle: start_cycle.saturating_add(duration),
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn pid(&self) -> &ProcessId {
        &self.pid
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    pub fn available_cycle(&self) -> u64 {
        self.available_cycle
    }

    pub fn is_due(&self, now: u64) -> bool {
        now >= self.available_cycle
    }

    /// Cycles of the duration already elapsed at `now`
    pub fn consumed(&self, now: u64) -> u64 {
        now.saturating_sub(self.start_cycle).min(self.duration)
    }

    pub fn remaining(&self, now: u64) -> u64 {
        self.duration - self.consumed(now)
    }

    /// Fraction of the duration elapsed, in `0.0..=1.0`
    pub fn progress(&self, now: u64) -> f64 {
        if self.duration == 0 {
            return 1.0;
        }
        self.consumed(now) as f64 / self.duration as f64
    }

    pub fn status(&self, now: u64) -> OperationStatus {
        if self.is_due(now) {
            OperationStatus::Complete
        } else if self.consumed(now) == 0 {
            OperationStatus::Waiting
        } else {
            OperationStatus::InProgress
        }
    }
}

/// What happened to the process of a finished operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Process is READY and back in the ready queue
    Ready,
    /// Process is READY but its next burst is I/O again
    NextIo,
    /// Process has no bursts left
    Finished,
    /// Pages could not be loaded; process is TERMINATED
    Failed,
    /// Process no longer exists or was not waiting on this operation
    Orphaned,
}

/// A finished operation and its effect
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub operation: PendingOperation,
    pub outcome: CompletionOutcome,
}

/// Scheduler state the completion manager acts on
pub trait CompletionContext {
    fn process_mut(&mut self, pid: &ProcessId) -> Option<&mut Process>;

    /// Loads one page; false when no frame can be found
    fn load_page(&mut self, pid: &ProcessId, page: usize) -> bool;

    /// Makes every page resident; false when some page cannot be loaded
    fn ensure_resident(&mut self, pid: &ProcessId, pages: usize) -> bool;

    /// Appends the process to the ready queue
    fn make_ready(&mut self, pid: &ProcessId);
}

/// Registry of in-flight I/O and fault operations
#[derive(Debug)]
pub struct IoManager {
    registry: Arc<SyncRegistry>,
    /// Records in registration order
    pending: Vec<PendingOperation>,
    audit_log: IoAuditLog,
}

impl IoManager {
    pub fn new(registry: Arc<SyncRegistry>) -> Self {
        Self {
            registry,
            pending: Vec::new(),
            audit_log: IoAuditLog::new(),
        }
    }

    fn register(&mut self, operation: PendingOperation, now: u64) -> OperationId {
        self.audit_log.record(IoEvent::Registered {
            operation: operation.id,
            pid: operation.pid.clone(),
            kind: operation.kind,
            duration: operation.duration,
            available_cycle: operation.available_cycle,
            timestamp_cycle: now,
        });
        let id = operation.id;
        self.pending.push(operation);
        id
    }

    /// Starts an I/O burst of `duration` cycles
    ///
    /// Returns None if the process already has an I/O in flight.
    pub fn start_io(&mut self, pid: &ProcessId, duration: u64, now: u64) -> Option<OperationId> {
        if self.has_pending_io(pid) {
            self.audit_log.record(IoEvent::DuplicateRejected {
                pid: pid.clone(),
                timestamp_cycle: now,
            });
            return None;
        }
        let operation = PendingOperation::new(pid.clone(), OperationKind::Io, duration, now);
        Some(self.register(operation, now))
    }

    /// Starts loading one faulted page
    pub fn start_page_fault(&mut self, pid: &ProcessId, page: usize, now: u64) -> OperationId {
        let operation = PendingOperation::new(
            pid.clone(),
            OperationKind::PageFault { page },
            PAGE_FAULT_CYCLES,
            now,
        );
        self.register(operation, now)
    }

    /// Starts loading every page of a process, one cycle per page
    pub fn start_full_load(&mut self, pid: &ProcessId, pages: usize, now: u64) -> OperationId {
        let duration = u64::try_from(pages).unwrap_or(u64::MAX).max(1);
        let operation = PendingOperation::new(pid.clone(), OperationKind::FullLoad, duration, now);
        self.register(operation, now)
    }

    /// Finalizes every operation due at `now`
    ///
    /// Due records are removed and applied in registration order, each
    /// under its process's lock.
    pub fn process_completed<C>(&mut self, now: u64, ctx: &mut C) -> Vec<Completion>
    where
        C: CompletionContext,
    {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|operation| operation.is_due(now));
        self.pending = pending;

        let mut completions = Vec::with_capacity(due.len());
        for operation in due {
            let outcome = {
                let _lock = self.registry.process_lock(&operation.pid);
                Self::apply(&operation, ctx)
            };

            let event = match outcome {
                CompletionOutcome::Failed => IoEvent::Failed {
                    operation: operation.id,
                    pid: operation.pid.clone(),
                    kind: operation.kind,
                    timestamp_cycle: now,
                },
                _ => IoEvent::Completed {
                    operation: operation.id,
                    pid: operation.pid.clone(),
                    kind: operation.kind,
                    timestamp_cycle: now,
                },
            };
            self.audit_log.record(event);
            completions.push(Completion { operation, outcome });
        }
        completions
    }

    fn apply<C: CompletionContext>(operation: &PendingOperation, ctx: &mut C) -> CompletionOutcome {
        let pid = &operation.pid;
        let Some(process) = ctx.process_mut(pid) else {
            return CompletionOutcome::Orphaned;
        };

        match operation.kind {
            OperationKind::Io => {
                if process.state() != ProcessState::BlockedIo {
                    return CompletionOutcome::Orphaned;
                }
                process.advance_burst();
                if process.state() == ProcessState::Terminated {
                    CompletionOutcome::Finished
                } else if process.is_current_burst_io() {
                    CompletionOutcome::NextIo
                } else {
                    ctx.make_ready(pid);
                    CompletionOutcome::Ready
                }
            }
            OperationKind::PageFault { page } => {
                if process.state() != ProcessState::BlockedMem {
                    return CompletionOutcome::Orphaned;
                }
                let loaded = ctx.load_page(pid, page);
                Self::settle_memory(pid, loaded, ctx)
            }
            OperationKind::FullLoad => {
                if process.state() != ProcessState::BlockedMem {
                    return CompletionOutcome::Orphaned;
                }
                let pages = process.pages();
                let loaded = ctx.ensure_resident(pid, pages);
                Self::settle_memory(pid, loaded, ctx)
            }
        }
    }

    fn settle_memory<C: CompletionContext>(pid: &ProcessId, loaded: bool, ctx: &mut C) -> CompletionOutcome {
        let Some(process) = ctx.process_mut(pid) else {
            return CompletionOutcome::Orphaned;
        };
        if loaded {
            process.set_state(ProcessState::Ready);
            ctx.make_ready(pid);
            CompletionOutcome::Ready
        } else {
            process.set_state(ProcessState::Terminated);
            CompletionOutcome::Failed
        }
    }

    /// Discards every pending record, returning how many were dropped
    pub fn shutdown(&mut self, now: u64) -> usize {
        let dropped = std::mem::take(&mut self.pending);
        for operation in &dropped {
            self.audit_log.record(IoEvent::Discarded {
                operation: operation.id,
                pid: operation.pid.clone(),
                timestamp_cycle: now,
            });
        }
        dropped.len()
    }

    pub fn active_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_active(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> &[PendingOperation] {
        &self.pending
    }

    pub fn pending_for<'a>(&'a self, pid: &'a ProcessId) -> impl Iterator<Item = &'a PendingOperation> {
        self.pending.iter().filter(move |operation| &operation.pid == pid)
    }

    pub fn has_pending_io(&self, pid: &ProcessId) -> bool {
        self.pending_for(pid)
            .any(|operation| operation.kind == OperationKind::Io)
    }

    pub fn audit_log(&self) -> &IoAuditLog {
        &self.audit_log
    }

    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paging::MemoryManager;
    use process_model::Burst;
    use std::collections::HashMap;

    /// Scheduler stand-in backed by a real memory manager
    struct TestContext {
        processes: HashMap<ProcessId, Process>,
        memory: MemoryManager,
        ready: Vec<ProcessId>,
    }

    impl TestContext {
        fn new(frames: usize) -> Self {
            Self {
                processes: HashMap::new(),
                memory: MemoryManager::new(frames, Box::new(paging::Fifo::new())).unwrap(),
                ready: Vec::new(),
            }
        }

        fn add(&mut self, process: Process, state: ProcessState) {
            let mut process = process;
            process.set_state(ProcessState::Ready);
            if state != ProcessState::Ready {
                process.set_state(state);
            }
            self.memory.create_process(process.id(), process.pages());
            self.processes.insert(process.id().clone(), process);
        }

        fn state(&self, pid: &str) -> ProcessState {
            self.processes[&ProcessId::from(pid)].state()
        }
    }

    impl CompletionContext for TestContext {
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
            self.ready.push(pid.clone());
        }
    }

    fn pid(name: &str) -> ProcessId {
        ProcessId::from(name)
    }

    fn manager() -> IoManager {
        IoManager::new(Arc::new(SyncRegistry::new()))
    }

    #[test]
    fn test_io_completes_at_start_plus_duration() {
        let mut io = manager();
        let mut ctx = TestContext::new(4);
        ctx.add(
            Process::new("P1", 0, vec![Burst::io(2), Burst::cpu(1)], 1),
            ProcessState::BlockedIo,
        );

        io.start_io(&pid("P1"), 2, 5).unwrap();
        assert!(io.process_completed(5, &mut ctx).is_empty());
        assert!(io.process_completed(6, &mut ctx).is_empty());
        assert_eq!(ctx.state("P1"), ProcessState::BlockedIo);

        let done = io.process_completed(7, &mut ctx);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].outcome, CompletionOutcome::Ready);
        assert_eq!(ctx.state("P1"), ProcessState::Ready);
        assert_eq!(ctx.ready, vec![pid("P1")]);
        assert!(!io.is_active());
    }

    #[test]
    fn test_io_completion_classifies_next_burst() {
        let mut io = manager();
        let mut ctx = TestContext::new(4);
        ctx.add(Process::new("last", 0, vec![Burst::io(1)], 1), ProcessState::BlockedIo);
        ctx.add(
            Process::new("chain", 0, vec![Burst::io(1), Burst::io(1)], 1),
            ProcessState::BlockedIo,
        );

        io.start_io(&pid("last"), 1, 0);
        io.start_io(&pid("chain"), 1, 0);
        let done = io.process_completed(1, &mut ctx);

        assert_eq!(done[0].outcome, CompletionOutcome::Finished);
        assert_eq!(done[1].outcome, CompletionOutcome::NextIo);
        assert_eq!(ctx.state("last"), ProcessState::Terminated);
        assert_eq!(ctx.state("chain"), ProcessState::Ready);
        assert!(ctx.ready.is_empty());
    }

    #[test]
    fn test_duplicate_io_rejected() {
        let mut io = manager();
        assert!(io.start_io(&pid("P1"), 3, 0).is_some());
        assert!(io.start_io(&pid("P1"), 3, 1).is_none());
        assert_eq!(io.active_count(), 1);
        assert!(io
            .audit_log()
            .has_event(|e| matches!(e, IoEvent::DuplicateRejected { .. })));

        // Faults are not I/O and are not limited
        io.start_page_fault(&pid("P1"), 0, 1);
        assert_eq!(io.active_count(), 2);
    }

    #[test]
    fn test_full_load_duration_scales_with_pages() {
        let mut io = manager();
        io.start_full_load(&pid("P1"), 4, 10);
        io.start_full_load(&pid("P2"), 0, 10);
        io.start_page_fault(&pid("P3"), 2, 10);

        let available: Vec<u64> = io.pending().iter().map(PendingOperation::available_cycle).collect();
        assert_eq!(available, vec![14, 11, 11]);
    }

    #[test]
    fn test_full_load_recovers_blocked_process() {
        let mut io = manager();
        let mut ctx = TestContext::new(3);
        ctx.add(Process::new("P1", 0, vec![Burst::cpu(2)], 3), ProcessState::BlockedMem);

        io.start_full_load(&pid("P1"), 3, 0);
        assert!(io.process_completed(2, &mut ctx).is_empty());

        let done = io.process_completed(3, &mut ctx);
        assert_eq!(done[0].outcome, CompletionOutcome::Ready);
        assert_eq!(ctx.state("P1"), ProcessState::Ready);
        assert_eq!(ctx.memory.presence_map(&pid("P1")), Some(vec![true, true, true]));
        assert_eq!(ctx.ready, vec![pid("P1")]);
    }

    #[test]
    fn test_full_load_failure_terminates() {
        let mut io = manager();
        let mut ctx = TestContext::new(2);
        ctx.add(Process::new("P1", 0, vec![Burst::cpu(2)], 3), ProcessState::BlockedMem);

        io.start_full_load(&pid("P1"), 3, 0);
        let done = io.process_completed(3, &mut ctx);

        assert_eq!(done[0].outcome, CompletionOutcome::Failed);
        assert_eq!(ctx.state("P1"), ProcessState::Terminated);
        assert!(ctx.ready.is_empty());
        assert!(io.audit_log().has_event(|e| matches!(e, IoEvent::Failed { .. })));
    }

    #[test]
    fn test_page_fault_loads_single_page() {
        let mut io = manager();
        let mut ctx = TestContext::new(2);
        ctx.add(Process::new("P1", 0, vec![Burst::cpu(2)], 2), ProcessState::BlockedMem);

        io.start_page_fault(&pid("P1"), 1, 4);
        let done = io.process_completed(5, &mut ctx);

        assert_eq!(done[0].outcome, CompletionOutcome::Ready);
        assert_eq!(ctx.memory.presence_map(&pid("P1")), Some(vec![false, true]));
    }

    #[test]
    fn test_unknown_process_is_orphaned() {
        let mut io = manager();
        let mut ctx = TestContext::new(1);
        io.start_io(&pid("ghost"), 1, 0);

        let done = io.process_completed(1, &mut ctx);
        assert_eq!(done[0].outcome, CompletionOutcome::Orphaned);
    }

    #[test]
    fn test_progress_and_status() {
        let mut io = manager();
        io.start_io(&pid("P1"), 4, 10);
        let op = &io.pending()[0];

        assert_eq!(op.status(10), OperationStatus::Waiting);
        assert_eq!(op.consumed(10), 0);
        assert_eq!(op.status(11), OperationStatus::InProgress);
        assert_eq!(op.remaining(11), 3);
        assert!((op.progress(12) - 0.5).abs() < f64::EPSILON);
        assert_eq!(op.status(14), OperationStatus::Complete);
        assert_eq!(op.remaining(20), 0);
    }

    #[test]
    fn test_shutdown_discards_pending() {
        let mut io = manager();
        io.start_io(&pid("P1"), 4, 0);
        io.start_full_load(&pid("P2"), 2, 0);

        assert_eq!(io.shutdown(1), 2);
        assert_eq!(io.active_count(), 0);
        assert_eq!(
            io.audit_log().count_events(|e| matches!(e, IoEvent::Discarded { .. })),
            2
        );
    }
}
