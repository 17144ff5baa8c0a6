//! Belady's optimal replacement over declared reference strings

use super::{MemoryView, ReplacementAlgorithm};
use core_types::{FrameId, ProcessId};
use std::collections::{HashMap, VecDeque};

/// Evicts the page whose next declared use is farthest away
///
/// Each process's remaining reference string is consumed from the front as
/// its resident pages are accessed. Loads never consume: a preload or a
/// fault being served is not a reference, and the faulting reference is
/// replayed as an access once its page is resident. An access that does
/// not match the head leaves the string untouched.
#[derive(Debug, Default)]
pub struct Optimal {
    remaining: HashMap<ProcessId, VecDeque<usize>>,
}

impl Optimal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance to the next use of `page` by `pid`; `usize::MAX` if never
    fn next_use_distance(&self, pid: &ProcessId, page: usize) -> usize {
        self.remaining
            .get(pid)
            .and_then(|seq| seq.iter().position(|&p| p == page))
            .unwrap_or(usize::MAX)
    }

    fn consume(&mut self, pid: &ProcessId, page: usize) {
        if let Some(seq) = self.remaining.get_mut(pid) {
            if seq.front() == Some(&page) {
                seq.pop_front();
            }
        }
    }
}

impl ReplacementAlgorithm for Optimal {
    fn name(&self) -> &'static str {
        "Optimal"
    }

    fn choose_victim(&self, view: &MemoryView<'_>, exclude: Option<&ProcessId>) -> Option<FrameId> {
        if let Some(free) = view.frames().iter().find(|frame| !frame.is_occupied()) {
            return Some(free.id());
        }

        let mut victim: Option<(FrameId, usize)> = None;
        for frame in view.frames() {
            let Some((owner, page)) = view.owner_of(frame.id()) else {
                return Some(frame.id());
            };
            if exclude == Some(owner) {
                continue;
            }

            let distance = self.next_use_distance(owner, page);
            if victim.map_or(true, |(_, farthest)| distance > farthest) {
                victim = Some((frame.id(), distance));
            }
        }

        victim.map(|(frame, _)| frame)
    }

    fn on_page_loaded(&mut self, _pid: &ProcessId, _page: usize, _frame: FrameId) {}

    fn on_page_access(&mut self, pid: &ProcessId, page: usize) {
        self.consume(pid, page);
    }

    fn on_page_unloaded(&mut self, _pid: &ProcessId, _page: usize, _frame: FrameId) {}

    fn register_future_references(&mut self, pid: &ProcessId, references: &[usize]) {
        self.remaining
            .insert(pid.clone(), references.iter().copied().collect());
    }

    fn future_references(&self, pid: &ProcessId) -> Option<Vec<usize>> {
        self.remaining
            .get(pid)
            .map(|seq| seq.iter().copied().collect())
    }
}
