//! First-in, first-out replacement

use super::{MemoryView, ReplacementAlgorithm};
use core_types::{FrameId, ProcessId};
use std::collections::VecDeque;

/// Evicts the frame that was loaded earliest
#[derive(Debug, Default)]
pub struct Fifo {
    load_order: VecDeque<FrameId>,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames in load order, oldest first
    pub fn load_order(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.load_order.iter().copied()
    }
}

impl ReplacementAlgorithm for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn choose_victim(&self, view: &MemoryView<'_>, exclude: Option<&ProcessId>) -> Option<FrameId> {
        // Excluded frames are skipped but keep their place in the queue
        self.load_order
            .iter()
            .copied()
            .find(|&frame| exclude.map_or(true, |pid| !view.is_owned_by(frame, pid)))
    }

    fn on_page_loaded(&mut self, _pid: &ProcessId, _page: usize, frame: FrameId) {
        self.load_order.push_back(frame);
    }

    fn on_page_access(&mut self, _pid: &ProcessId, _page: usize) {}

    fn on_page_unloaded(&mut self, _pid: &ProcessId, _page: usize, frame: FrameId) {
        if let Some(position) = self.load_order.iter().position(|&f| f == frame) {
            self.load_order.remove(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacement::test_support::layout;

    fn pid(name: &str) -> ProcessId {
        ProcessId::from(name)
    }

    #[test]
    fn test_victim_is_earliest_loaded() {
        let (frames, tables) = layout(&[Some(("P1", 0)), Some(("P2", 0)), Some(("P3", 0))], 1);
        let view = MemoryView::new(&frames, &tables);

        let mut fifo = Fifo::new();
        fifo.on_page_loaded(&pid("P2"), 0, FrameId::new(1));
        fifo.on_page_loaded(&pid("P1"), 0, FrameId::new(0));
        fifo.on_page_loaded(&pid("P3"), 0, FrameId::new(2));

        assert_eq!(fifo.choose_victim(&view, None), Some(FrameId::new(1)));
    }

    #[test]
    fn test_excluded_frames_are_skipped_not_removed() {
        let (frames, tables) = layout(&[Some(("P1", 0)), Some(("P2", 0))], 1);
        let view = MemoryView::new(&frames, &tables);

        let mut fifo = Fifo::new();
        fifo.on_page_loaded(&pid("P1"), 0, FrameId::new(0));
        fifo.on_page_loaded(&pid("P2"), 0, FrameId::new(1));

        assert_eq!(fifo.choose_victim(&view, Some(&pid("P1"))), Some(FrameId::new(1)));
        assert_eq!(
            fifo.load_order().collect::<Vec<_>>(),
            vec![FrameId::new(0), FrameId::new(1)]
        );
    }

    #[test]
    fn test_all_frames_excluded() {
        let (frames, tables) = layout(&[Some(("P1", 0)), Some(("P1", 1))], 2);
        let view = MemoryView::new(&frames, &tables);

        let mut fifo = Fifo::new();
        fifo.on_page_loaded(&pid("P1"), 0, FrameId::new(0));
        fifo.on_page_loaded(&pid("P1"), 1, FrameId::new(1));

        assert_eq!(fifo.choose_victim(&view, Some(&pid("P1"))), None);
    }

    #[test]
    fn test_unload_removes_that_frame() {
        let mut fifo = Fifo::new();
        fifo.on_page_loaded(&pid("P1"), 0, FrameId::new(0));
        fifo.on_page_loaded(&pid("P1"), 1, FrameId::new(1));
        fifo.on_page_loaded(&pid("P2"), 0, FrameId::new(2));

        fifo.on_page_unloaded(&pid("P1"), 1, FrameId::new(1));
        assert_eq!(
            fifo.load_order().collect::<Vec<_>>(),
            vec![FrameId::new(0), FrameId::new(2)]
        );
    }
}
