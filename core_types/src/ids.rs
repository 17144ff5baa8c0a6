//! Unique identifiers for simulation entities

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a simulated process
///
/// Process identifiers come from the process definitions (`P1`, `P2`, ...),
/// so unlike the other identifiers they are caller-chosen strings.
/// Ordering is lexical and is used wherever a deterministic iteration
/// order over processes is needed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(String);

impl ProcessId {
    /// Creates a process ID from its textual name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the textual name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProcessId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProcessId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a physical memory frame
///
/// Frames are allocated once when the memory manager is built and are
/// addressed by their position in the frame arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId(usize);

impl FrameId {
    /// Creates a frame ID from an arena index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

/// Unique identifier for an in-flight I/O or page-fault operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Creates a new random operation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an operation ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Op({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_from_str() {
        let id = ProcessId::from("P1");
        assert_eq!(id.as_str(), "P1");
        assert_eq!(id, ProcessId::new(String::from("P1")));
    }

    #[test]
    fn test_process_id_ordering_is_lexical() {
        let mut ids = vec![ProcessId::from("P3"), ProcessId::from("P1"), ProcessId::from("P2")];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_process_id_display() {
        assert_eq!(format!("{}", ProcessId::from("P7")), "P7");
    }

    #[test]
    fn test_frame_id_index() {
        let frame = FrameId::new(4);
        assert_eq!(frame.index(), 4);
        assert_eq!(format!("{}", frame), "Frame(4)");
    }

    #[test]
    fn test_operation_id_creation() {
        let id1 = OperationId::new();
        let id2 = OperationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_operation_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = OperationId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn test_ids_serialize() {
        let json = serde_json::to_string(&ProcessId::from("P1")).unwrap();
        assert_eq!(json, "\"P1\"");
        let frame: FrameId = serde_json::from_str("3").unwrap();
        assert_eq!(frame, FrameId::new(3));
    }
}
