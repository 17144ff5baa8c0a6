//! Least-recently-used replacement

use super::{MemoryView, ReplacementAlgorithm};
use core_types::{FrameId, ProcessId};
use std::collections::HashMap;

/// Evicts the page with the oldest logical access time
///
/// The clock ticks on every load and access. Pages without a recorded
/// time count as time 0.
#[derive(Debug, Default)]
pub struct Lru {
    clock: u64,
    last_access: HashMap<(ProcessId, usize), u64>,
}

impl Lru {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded access time of a page
    pub fn last_access(&self, pid: &ProcessId, page: usize) -> Option<u64> {
        self.last_access.get(&(pid.clone(), page)).copied()
    }

    fn touch(&mut self, pid: &ProcessId, page: usize) {
        self.clock += 1;
        self.last_access.insert((pid.clone(), page), self.clock);
    }
}

impl ReplacementAlgorithm for Lru {
    fn name(&self) -> &'static str {
        "LRU"
    }

    fn choose_victim(&self, view: &MemoryView<'_>, exclude: Option<&ProcessId>) -> Option<FrameId> {
        let mut victim: Option<(FrameId, u64)> = None;

        for frame in view.frames() {
            if !frame.is_occupied() {
                return Some(frame.id());
            }
            let Some((owner, page)) = view.owner_of(frame.id()) else {
                // Occupied but unmapped: reclaim it directly
                return Some(frame.id());
            };
            if exclude == Some(owner) {
                continue;
            }

            let stamp = self
                .last_access
                .get(&(owner.clone(), page))
                .copied()
                .unwrap_or(0);
            if victim.map_or(true, |(_, oldest)| stamp < oldest) {
                victim = Some((frame.id(), stamp));
            }
        }

        victim.map(|(frame, _)| frame)
    }

    fn on_page_loaded(&mut self, pid: &ProcessId, page: usize, _frame: FrameId) {
        self.touch(pid, page);
    }

    fn on_page_access(&mut self, pid: &ProcessId, page: usize) {
        self.touch(pid, page);
    }

    fn on_page_unloaded(&mut self, pid: &ProcessId, page: usize, _frame: FrameId) {
        self.last_access.remove(&(pid.clone(), page));
    }
}
