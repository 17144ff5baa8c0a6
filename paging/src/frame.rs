//! Physical frames

use core_types::{FrameId, ProcessId};
use serde::{Deserialize, Serialize};

/// One physical memory slot
///
/// A frame only knows whether it is occupied. Which page lives in it is
/// recorded in the owning process's page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    id: FrameId,
    occupied: bool,
}

impl Frame {
    pub fn new(id: FrameId) -> Self {
        Self {
            id,
            occupied: false,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn occupy(&mut self) {
        self.occupied = true;
    }

    pub fn free(&mut self) {
        self.occupied = false;
    }
}

/// Occupancy of one frame, as reported to inspectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOccupancy {
    Free,
    Page { owner: ProcessId, page: usize },
}

impl FrameOccupancy {
    pub fn is_free(&self) -> bool {
        matches!(self, FrameOccupancy::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_and_free() {
        let mut frame = Frame::new(FrameId::new(3));
        assert_eq!(frame.id(), FrameId::new(3));
        assert!(!frame.is_occupied());

        frame.occupy();
        assert!(frame.is_occupied());
        frame.free();
        assert!(!frame.is_occupied());
    }
}
