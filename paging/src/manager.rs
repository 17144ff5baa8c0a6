//! Demand-paged memory manager

use crate::events::{MemoryAuditLog, MemoryEvent};
use crate::replacement::{MemoryView, ReplacementAlgorithm, ReplacementKind};
use crate::{Frame, FrameOccupancy, MemoryError, PageTable};
use core_types::{FrameId, ProcessId};
use process_model::Process;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Memory configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of physical frames
    pub total_frames: usize,
    /// Replacement policy
    pub replacement: ReplacementKind,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            total_frames: 7,
            replacement: ReplacementKind::Fifo,
        }
    }
}

impl MemoryConfig {
    pub fn build(&self) -> Result<MemoryManager, MemoryError> {
        MemoryManager::new(self.total_frames, self.replacement.build())
    }
}

/// Owner of the frame arena and every page table
///
/// Frames are allocated once at construction. Free frames are handed out
/// in the order they became free; when none is left the replacement
/// algorithm picks a victim, never one of the requester's own pages.
#[derive(Debug)]
pub struct MemoryManager {
    frames: Vec<Frame>,
    free_frames: VecDeque<FrameId>,
    page_tables: HashMap<ProcessId, PageTable>,
    algorithm: Box<dyn ReplacementAlgorithm>,
    page_faults: HashMap<ProcessId, u64>,
    replacements: HashMap<ProcessId, u64>,
    /// Cycle stamped on audit events
    cycle: u64,
    audit_log: MemoryAuditLog,
}

impl MemoryManager {
    /// Creates a manager with `total_frames` free frames
    pub fn new(
        total_frames: usize,
        algorithm: Box<dyn ReplacementAlgorithm>,
    ) -> Result<Self, MemoryError> {
        if total_frames == 0 {
            return Err(MemoryError::NoFrames);
        }

        let frames: Vec<Frame> = (0..total_frames).map(|i| Frame::new(FrameId::new(i))).collect();
        let free_frames = frames.iter().map(Frame::id).collect();

        Ok(Self {
            frames,
            free_frames,
            page_tables: HashMap::new(),
            algorithm,
            page_faults: HashMap::new(),
            replacements: HashMap::new(),
            cycle: 0,
            audit_log: MemoryAuditLog::new(),
        })
    }

    /// Sets the cycle stamped on subsequent audit events
    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }

    /// Allocates an empty page table; an existing table is kept
    pub fn create_process(&mut self, pid: &ProcessId, total_pages: usize) {
        self.page_tables
            .entry(pid.clone())
            .or_insert_with(|| PageTable::new(pid.clone(), total_pages));
    }

    /// Hands a declared reference string to the replacement algorithm
    pub fn register_future_references(&mut self, pid: &ProcessId, references: &[usize]) {
        self.algorithm.register_future_references(pid, references);
    }

    pub fn has_process(&self, pid: &ProcessId) -> bool {
        self.page_tables.contains_key(pid)
    }

    pub fn is_page_loaded(&self, pid: &ProcessId, page: usize) -> bool {
        self.page_tables
            .get(pid)
            .is_some_and(|table| table.is_page_loaded(page))
    }

    /// Makes `page` of `pid` resident
    ///
    /// A resident page only records an access. Otherwise the fault is
    /// counted and served from the free pool or by eviction; the load itself
    /// is not an access. Returns false when the process or page is unknown
    /// or no victim exists.
    pub fn load_page(&mut self, pid: &ProcessId, page: usize) -> bool {
        let Some(table) = self.page_tables.get(pid) else {
            return false;
        };
        if page >= table.total_pages() {
            return false;
        }

        if table.is_page_loaded(page) {
            self.algorithm.on_page_access(pid, page);
            self.audit_log.record(MemoryEvent::PageHit {
                pid: pid.clone(),
                page,
                timestamp_cycle: self.cycle,
            });
            return true;
        }

        *self.page_faults.entry(pid.clone()).or_insert(0) += 1;
        self.audit_log.record(MemoryEvent::PageFault {
            pid: pid.clone(),
            page,
            timestamp_cycle: self.cycle,
        });

        let target = match self.free_frames.pop_front() {
            Some(frame) => frame,
            None => match self.evict_for(pid, page) {
                Some(frame) => frame,
                None => return false,
            },
        };

        if let Some(frame) = self.frames.get_mut(target.index()) {
            frame.occupy();
        }
        if let Some(table) = self.page_tables.get_mut(pid) {
            table.page_loaded(page, target);
        }
        self.algorithm.on_page_loaded(pid, page, target);
        self.audit_log.record(MemoryEvent::PageLoaded {
            pid: pid.clone(),
            page,
            frame: target,
            timestamp_cycle: self.cycle,
        });

        true
    }

    /// Frees a frame for `requester`, returning it still unoccupied
    fn evict_for(&mut self, requester: &ProcessId, page: usize) -> Option<FrameId> {
        let victim = {
            let view = MemoryView::new(&self.frames, &self.page_tables);
            self.algorithm
                .choose_victim(&view, Some(requester))
                .and_then(|frame| {
                    view.owner_of(frame)
                        .map(|(owner, victim_page)| (frame, owner.clone(), victim_page))
                })
        };

        let Some((frame, owner, victim_page)) = victim else {
            self.audit_log.record(MemoryEvent::VictimNotFound {
                pid: requester.clone(),
                page,
                timestamp_cycle: self.cycle,
            });
            return None;
        };
        debug_assert_ne!(&owner, requester, "evicted a page of the faulting process");

        if let Some(table) = self.page_tables.get_mut(&owner) {
            table.page_unloaded(victim_page);
        }
        self.algorithm.on_page_unloaded(&owner, victim_page, frame);
        if let Some(slot) = self.frames.get_mut(frame.index()) {
            slot.free();
        }
        *self.replacements.entry(requester.clone()).or_insert(0) += 1;
        self.audit_log.record(MemoryEvent::PageEvicted {
            victim: owner,
            page: victim_page,
            frame,
            requester: requester.clone(),
            timestamp_cycle: self.cycle,
        });

        Some(frame)
    }

    /// Makes every page of `process` resident
    ///
    /// Creates the page table if absent. Resident pages are skipped, so the
    /// preload records no access. Stops at the first page that cannot be
    /// loaded; pages loaded before that stay resident.
    pub fn ensure_pages(&mut self, process: &Process) -> bool {
        self.ensure_resident(process.id(), process.pages())
    }

    /// [`ensure_pages`](Self::ensure_pages) by process id and page count
    pub fn ensure_resident(&mut self, pid: &ProcessId, pages: usize) -> bool {
        self.create_process(pid, pages);

        let total_pages = self
            .page_tables
            .get(pid)
            .map_or(0, PageTable::total_pages);
        for page in 0..total_pages {
            if !self.is_page_loaded(pid, page) && !self.load_page(pid, page) {
                return false;
            }
        }
        true
    }

    /// Returns every frame of `pid` to the free pool
    ///
    /// The page table and counters are kept for reporting. Returns the
    /// number of frames freed.
    pub fn release_process_memory(&mut self, pid: &ProcessId) -> usize {
        let Some(table) = self.page_tables.get_mut(pid) else {
            return 0;
        };

        let loaded: Vec<(usize, FrameId)> = table.loaded_pages().collect();
        for &(page, frame) in &loaded {
            table.page_unloaded(page);
            self.algorithm.on_page_unloaded(pid, page, frame);
            if let Some(slot) = self.frames.get_mut(frame.index()) {
                slot.free();
            }
            self.free_frames.push_back(frame);
        }

        self.audit_log.record(MemoryEvent::ProcessReleased {
            pid: pid.clone(),
            frames_freed: loaded.len(),
            timestamp_cycle: self.cycle,
        });
        loaded.len()
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn free_frames(&self) -> usize {
        self.free_frames.len()
    }

    pub fn occupied_frames(&self) -> usize {
        self.frames.iter().filter(|frame| frame.is_occupied()).count()
    }

    pub fn page_faults(&self, pid: &ProcessId) -> u64 {
        self.page_faults.get(pid).copied().unwrap_or(0)
    }

    pub fn replacements(&self, pid: &ProcessId) -> u64 {
        self.replacements.get(pid).copied().unwrap_or(0)
    }

    /// Which (process, page) occupies `frame`
    pub fn frame_owner(&self, frame: FrameId) -> Option<(ProcessId, usize)> {
        MemoryView::new(&self.frames, &self.page_tables)
            .owner_of(frame)
            .map(|(pid, page)| (pid.clone(), page))
    }

    /// Occupancy of every frame, in frame order
    pub fn frame_occupancy(&self) -> Vec<FrameOccupancy> {
        self.frames
            .iter()
            .map(|frame| match self.frame_owner(frame.id()) {
                Some((owner, page)) if frame.is_occupied() => FrameOccupancy::Page { owner, page },
                _ => FrameOccupancy::Free,
            })
            .collect()
    }

    pub fn page_table(&self, pid: &ProcessId) -> Option<&PageTable> {
        self.page_tables.get(pid)
    }

    pub fn presence_map(&self, pid: &ProcessId) -> Option<Vec<bool>> {
        self.page_tables.get(pid).map(PageTable::presence_map)
    }

    /// Resident pages across every page table
    pub fn present_page_count(&self) -> usize {
        self.page_tables.values().map(PageTable::present_count).sum()
    }

    /// Checks the frame bookkeeping against the page tables
    ///
    /// Free plus occupied equals total, the free pool holds exactly the
    /// unoccupied frames, and every occupied frame has one present page.
    pub fn is_consistent(&self) -> bool {
        let occupied = self.occupied_frames();
        let free_listed_unoccupied = self.free_frames.iter().all(|id| {
            self.frames
                .get(id.index())
                .is_some_and(|frame| !frame.is_occupied())
        });

        self.free_frames() + occupied == self.total_frames()
            && free_listed_unoccupied
            && self.present_page_count() == occupied
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn algorithm(&self) -> &dyn ReplacementAlgorithm {
        self.algorithm.as_ref()
    }

    pub fn audit_log(&self) -> &MemoryAuditLog {
        &self.audit_log
    }

    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacement::{Fifo, Lru, Optimal};
    use process_model::Burst;

    fn pid(name: &str) -> ProcessId {
        ProcessId::from(name)
    }

    fn manager(frames: usize) -> MemoryManager {
        MemoryManager::new(frames, Box::new(Fifo::new())).unwrap()
    }

    fn process(name: &str, pages: usize) -> Process {
        Process::new(name, 0, vec![Burst::cpu(1)], pages)
    }

    #[test]
    fn test_zero_frames_rejected() {
        let result = MemoryManager::new(0, Box::new(Fifo::new()));
        assert!(matches!(result, Err(MemoryError::NoFrames)));
    }

    #[test]
    fn test_default_config() {
        let config = MemoryConfig::default();
        assert_eq!(config.total_frames, 7);
        assert_eq!(config.replacement, ReplacementKind::Fifo);

        let mm = config.build().unwrap();
        assert_eq!(mm.total_frames(), 7);
        assert_eq!(mm.free_frames(), 7);
        assert_eq!(mm.algorithm_name(), "FIFO");
    }

    #[test]
    fn test_load_from_free_pool_in_order() {
        let mut mm = manager(3);
        mm.create_process(&pid("P1"), 2);

        assert!(mm.load_page(&pid("P1"), 1));
        assert!(mm.load_page(&pid("P1"), 0));
        assert_eq!(mm.frame_owner(FrameId::new(0)), Some((pid("P1"), 1)));
        assert_eq!(mm.frame_owner(FrameId::new(1)), Some((pid("P1"), 0)));
        assert_eq!(mm.page_faults(&pid("P1")), 2);
        assert_eq!(mm.replacements(&pid("P1")), 0);
        assert_eq!(mm.free_frames(), 1);
        assert!(mm.is_consistent());
    }

    #[test]
    fn test_resident_page_is_a_hit() {
        let mut mm = manager(2);
        mm.create_process(&pid("P1"), 1);
        assert!(mm.load_page(&pid("P1"), 0));
        assert!(mm.load_page(&pid("P1"), 0));

        assert_eq!(mm.page_faults(&pid("P1")), 1);
        assert_eq!(mm.audit_log().count_events(|e| matches!(e, MemoryEvent::PageHit { .. })), 1);
    }

    #[test]
    fn test_unknown_process_or_page() {
        let mut mm = manager(2);
        assert!(!mm.load_page(&pid("P1"), 0));

        mm.create_process(&pid("P1"), 1);
        assert!(!mm.load_page(&pid("P1"), 1));
        assert_eq!(mm.page_faults(&pid("P1")), 0);
    }

    #[test]
    fn test_fifo_replacement_evicts_earliest_loaded() {
        let mut mm = manager(2);
        for name in ["P1", "P2", "P3"] {
            mm.create_process(&pid(name), 1);
        }

        assert!(mm.load_page(&pid("P1"), 0));
        assert!(mm.load_page(&pid("P2"), 0));
        assert!(mm.load_page(&pid("P3"), 0));

        assert!(!mm.is_page_loaded(&pid("P1"), 0));
        assert!(mm.is_page_loaded(&pid("P2"), 0));
        assert_eq!(mm.frame_owner(FrameId::new(0)), Some((pid("P3"), 0)));
        assert_eq!(mm.replacements(&pid("P3")), 1);
        assert!(mm.audit_log().has_event(|e| matches!(
            e,
            MemoryEvent::PageEvicted { victim, requester, .. }
                if victim.as_str() == "P1" && requester.as_str() == "P3"
        )));
        assert!(mm.is_consistent());
    }

    #[test]
    fn test_never_evicts_own_pages() {
        let mut mm = manager(2);
        let p = process("P1", 3);
        assert!(!mm.ensure_pages(&p));

        // Pages loaded before the failure stay resident
        assert_eq!(mm.presence_map(&pid("P1")), Some(vec![true, true, false]));
        assert_eq!(mm.page_faults(&pid("P1")), 3);
        assert_eq!(mm.replacements(&pid("P1")), 0);
        assert!(mm.audit_log().has_event(|e| matches!(e, MemoryEvent::VictimNotFound { page: 2, .. })));
        assert!(mm.is_consistent());
    }

    #[test]
    fn test_ensure_pages_evicts_other_processes() {
        let mut mm = manager(3);
        assert!(mm.ensure_pages(&process("P1", 2)));
        assert!(mm.ensure_pages(&process("P2", 3)));

        assert_eq!(mm.presence_map(&pid("P1")), Some(vec![false, false]));
        assert_eq!(mm.presence_map(&pid("P2")), Some(vec![true, true, true]));
        assert_eq!(mm.replacements(&pid("P2")), 2);
        assert!(mm.is_consistent());
    }

    #[test]
    fn test_ensure_pages_skips_resident_pages() {
        let mut mm = manager(3);
        let p = process("P1", 2);
        assert!(mm.ensure_pages(&p));
        assert!(mm.ensure_pages(&p));
        assert_eq!(mm.page_faults(&pid("P1")), 2);
        assert_eq!(mm.audit_log().count_events(|e| matches!(e, MemoryEvent::PageHit { .. })), 0);
    }

    #[test]
    fn test_release_returns_frames() {
        let mut mm = manager(4);
        assert!(mm.ensure_pages(&process("P1", 3)));
        assert_eq!(mm.free_frames(), 1);

        assert_eq!(mm.release_process_memory(&pid("P1")), 3);
        assert_eq!(mm.free_frames(), 4);
        assert_eq!(mm.present_page_count(), 0);
        assert!(mm.frame_occupancy().iter().all(FrameOccupancy::is_free));
        // Counters survive release
        assert_eq!(mm.page_faults(&pid("P1")), 3);
        assert!(mm.is_consistent());

        assert_eq!(mm.release_process_memory(&pid("nobody")), 0);
    }

    #[test]
    fn test_freed_frames_are_reused_after_original_free_frames() {
        let mut mm = manager(3);
        assert!(mm.ensure_pages(&process("P1", 1)));
        mm.release_process_memory(&pid("P1"));

        assert!(mm.ensure_pages(&process("P2", 3)));
        assert_eq!(mm.frame_owner(FrameId::new(1)), Some((pid("P2"), 0)));
        assert_eq!(mm.frame_owner(FrameId::new(2)), Some((pid("P2"), 1)));
        assert_eq!(mm.frame_owner(FrameId::new(0)), Some((pid("P2"), 2)));
    }

    #[test]
    fn test_frame_occupancy_map() {
        let mut mm = manager(3);
        mm.create_process(&pid("P1"), 2);
        assert!(mm.load_page(&pid("P1"), 1));

        assert_eq!(
            mm.frame_occupancy(),
            vec![
                FrameOccupancy::Page { owner: pid("P1"), page: 1 },
                FrameOccupancy::Free,
                FrameOccupancy::Free,
            ]
        );
    }

    #[test]
    fn test_lru_manager_evicts_least_recent() {
        let mut mm = MemoryManager::new(2, Box::new(Lru::new())).unwrap();
        for name in ["P1", "P2", "P3"] {
            mm.create_process(&pid(name), 1);
        }
        assert!(mm.load_page(&pid("P1"), 0));
        assert!(mm.load_page(&pid("P2"), 0));
        // Touch P1 so that P2 becomes least recent
        assert!(mm.load_page(&pid("P1"), 0));
        assert!(mm.load_page(&pid("P3"), 0));

        assert!(mm.is_page_loaded(&pid("P1"), 0));
        assert!(!mm.is_page_loaded(&pid("P2"), 0));
    }

    #[test]
    fn test_optimal_manager_consumes_on_access_only() {
        let mut mm = MemoryManager::new(2, Box::new(Optimal::new())).unwrap();
        mm.create_process(&pid("P1"), 2);
        mm.register_future_references(&pid("P1"), &[0, 1, 0]);

        // Serving the fault loads the page without consuming
        assert!(mm.load_page(&pid("P1"), 0));
        assert_eq!(mm.algorithm().future_references(&pid("P1")), Some(vec![0, 1, 0]));

        assert!(mm.load_page(&pid("P1"), 0));
        assert_eq!(mm.algorithm().future_references(&pid("P1")), Some(vec![1, 0]));
        // Page 0 again: not the head, nothing consumed
        assert!(mm.load_page(&pid("P1"), 0));
        assert_eq!(mm.algorithm().future_references(&pid("P1")), Some(vec![1, 0]));
    }

    #[test]
    fn test_optimal_preload_keeps_references() {
        let mut mm = MemoryManager::new(4, Box::new(Optimal::new())).unwrap();
        let p = process("P1", 2).with_future_references(vec![0, 1, 0, 1]);
        mm.create_process(p.id(), p.pages());
        mm.register_future_references(p.id(), &[0, 1, 0, 1]);

        assert!(mm.ensure_pages(&p));
        assert_eq!(
            mm.algorithm().future_references(&pid("P1")),
            Some(vec![0, 1, 0, 1])
        );
    }

    #[test]
    fn test_events_carry_cycle() {
        let mut mm = manager(1);
        mm.set_cycle(5);
        mm.create_process(&pid("P1"), 1);
        assert!(mm.load_page(&pid("P1"), 0));
        assert!(mm.audit_log().has_event(|e| matches!(
            e,
            MemoryEvent::PageLoaded { timestamp_cycle: 5, .. }
        )));

        mm.clear_audit_log();
        assert!(mm.audit_log().is_empty());
    }

    #[test]
    fn test_events_serialize() {
        let mut mm = manager(1);
        mm.create_process(&pid("P1"), 1);
        assert!(mm.load_page(&pid("P1"), 0));

        let json = serde_json::to_string(&mm.audit_log().events()[1]).unwrap();
        assert!(json.contains("PageLoaded"));
        assert!(json.contains("\"pid\":\"P1\""));
    }
}
