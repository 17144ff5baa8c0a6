//! # Page Replacement
//!
//! Victim selection policies for the memory manager.
//!
//! An algorithm never owns frames or page tables. It reads them through a
//! [`MemoryView`] when a victim is needed and keeps only its own
//! bookkeeping, updated by the load/access/unload notifications.

mod fifo;
mod lru;
mod optimal;

pub use fifo::Fifo;
pub use lru::Lru;
pub use optimal::Optimal;

use crate::{Frame, MemoryError, PageTable};
use core_types::{FrameId, ProcessId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Read-only view of frame occupancy and page tables
#[derive(Debug, Clone, Copy)]
pub struct MemoryView<'a> {
    frames: &'a [Frame],
    page_tables: &'a HashMap<ProcessId, PageTable>,
}

impl<'a> MemoryView<'a> {
    pub fn new(frames: &'a [Frame], page_tables: &'a HashMap<ProcessId, PageTable>) -> Self {
        Self {
            frames,
            page_tables,
        }
    }

    pub fn frames(&self) -> &'a [Frame] {
        self.frames
    }

    /// Finds the (process, page) mapped to `frame`
    pub fn owner_of(&self, frame: FrameId) -> Option<(&'a ProcessId, usize)> {
        self.page_tables
            .iter()
            .find_map(|(pid, table)| table.find_page_in_frame(frame).map(|page| (pid, page)))
    }

    /// Checks if `frame` holds a page of `pid`
    pub fn is_owned_by(&self, frame: FrameId, pid: &ProcessId) -> bool {
        self.page_tables
            .get(pid)
            .is_some_and(|table| table.find_page_in_frame(frame).is_some())
    }
}

/// Replacement policy
///
/// `choose_victim` must never return a frame owned by `exclude`.
pub trait ReplacementAlgorithm: Send + fmt::Debug {
    /// Display name of the policy
    fn name(&self) -> &'static str;

    /// Picks the frame to evict, or None when no frame is eligible
    fn choose_victim(&self, view: &MemoryView<'_>, exclude: Option<&ProcessId>) -> Option<FrameId>;

    fn on_page_loaded(&mut self, pid: &ProcessId, page: usize, frame: FrameId);

    fn on_page_access(&mut self, pid: &ProcessId, page: usize);

    fn on_page_unloaded(&mut self, pid: &ProcessId, page: usize, frame: FrameId);

    /// Supplies the predicted reference string of a process
    ///
    /// Only policies that look into the future use it.
    fn register_future_references(&mut self, _pid: &ProcessId, _references: &[usize]) {}

    /// Remaining predicted references of a process, if tracked
    fn future_references(&self, _pid: &ProcessId) -> Option<Vec<usize>> {
        None
    }
}

/// Selectable replacement policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementKind {
    #[default]
    Fifo,
    Lru,
    Optimal,
}

impl ReplacementKind {
    /// Creates a fresh instance of the policy
    pub fn build(self) -> Box<dyn ReplacementAlgorithm> {
        match self {
            ReplacementKind::Fifo => Box::new(Fifo::new()),
            ReplacementKind::Lru => Box::new(Lru::new()),
            ReplacementKind::Optimal => Box::new(Optimal::new()),
        }
    }
}

impl FromStr for ReplacementKind {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(ReplacementKind::Fifo),
            "lru" => Ok(ReplacementKind::Lru),
            "optimal" | "opt" => Ok(ReplacementKind::Optimal),
            _ => Err(MemoryError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementKind::Fifo => "FIFO",
            ReplacementKind::Lru => "LRU",
            ReplacementKind::Optimal => "OPTIMAL",
        };
        f.write_str(name)
    }
}
