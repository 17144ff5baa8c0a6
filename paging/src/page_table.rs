//! Per-process page tables

use core_types::{FrameId, ProcessId};
use serde::{Deserialize, Serialize};

/// Mapping of one virtual page
///
/// The page is present exactly when it has a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTableEntry {
    frame: Option<FrameId>,
}

impl PageTableEntry {
    pub fn frame(&self) -> Option<FrameId> {
        self.frame
    }

    pub fn is_present(&self) -> bool {
        self.frame.is_some()
    }
}

/// Flat page table indexed by virtual page number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTable {
    owner: ProcessId,
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    /// Creates a table with `total_pages` absent entries
    pub fn new(owner: ProcessId, total_pages: usize) -> Self {
        Self {
            owner,
            entries: vec![PageTableEntry::default(); total_pages],
        }
    }

    pub fn owner(&self) -> &ProcessId {
        &self.owner
    }

    pub fn total_pages(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, page: usize) -> Option<&PageTableEntry> {
        self.entries.get(page)
    }

    /// Checks if `page` is resident; out-of-range pages never are
    pub fn is_page_loaded(&self, page: usize) -> bool {
        self.entry(page).is_some_and(PageTableEntry::is_present)
    }

    /// Marks `page` as resident in `frame`; ignored when out of range
    pub fn page_loaded(&mut self, page: usize, frame: FrameId) {
        if let Some(entry) = self.entries.get_mut(page) {
            entry.frame = Some(frame);
        }
    }

    /// Marks `page` as absent, returning the frame it occupied
    pub fn page_unloaded(&mut self, page: usize) -> Option<FrameId> {
        self.entries.get_mut(page).and_then(|entry| entry.frame.take())
    }

    /// Reverse lookup: which page of this table lives in `frame`
    pub fn find_page_in_frame(&self, frame: FrameId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.frame == Some(frame))
    }

    /// Resident pages with their frames, in page order
    pub fn loaded_pages(&self) -> impl Iterator<Item = (usize, FrameId)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(page, entry)| entry.frame.map(|frame| (page, frame)))
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_present()).count()
    }

    /// Presence bit per page
    pub fn presence_map(&self) -> Vec<bool> {
        self.entries.iter().map(PageTableEntry::is_present).collect()
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.entries.iter().all(PageTableEntry::is_present)
    }
}
