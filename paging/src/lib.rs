//! # Paging
//!
//! Demand-paged virtual memory for the scheduler simulation.
//!
//! ## Philosophy
//!
//! - Frames live in a fixed arena indexed by [`FrameId`](core_types::FrameId)
//! - Page tables are flat arrays indexed by page number
//! - The [`MemoryManager`] owns both; nothing else touches them directly
//! - Replacement policies are pluggable behind [`ReplacementAlgorithm`]
//!
//! ## Example
//!
//! ```
//! use core_types::ProcessId;
//! use paging::{MemoryConfig, ReplacementKind};
//!
//! let config = MemoryConfig { total_frames: 2, replacement: ReplacementKind::Lru };
//! let mut memory = config.build().unwrap();
//! let pid = ProcessId::from("P1");
//! memory.create_process(&pid, 1);
//! assert!(memory.load_page(&pid, 0));
//! assert_eq!(memory.free_frames(), 1);
//! ```

pub mod error;
pub mod events;
pub mod frame;
pub mod manager;
pub mod page_table;
pub mod replacement;

pub use error::MemoryError;
pub use events::{MemoryAuditLog, MemoryEvent};
pub use frame::{Frame, FrameOccupancy};
pub use manager::{MemoryConfig, MemoryManager};
pub use page_table::{PageTable, PageTableEntry};
pub use replacement::{
    Fifo, Lru, MemoryView, Optimal, ReplacementAlgorithm, ReplacementKind,
};
