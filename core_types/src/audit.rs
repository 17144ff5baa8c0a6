//! Append-only event logs
//!
//! Every component of the simulator records what it did as a typed event
//! rather than printing. Tests query the log with predicates; the CLI can
//! dump it as JSON lines.

use serde::{Deserialize, Serialize};

/// Ordered log of events of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog<E> {
    events: Vec<E>,
}

impl<E> AuditLog<E> {
    /// Creates a new empty log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event
    pub fn record(&mut self, event: E) {
        self.events.push(event);
    }

    /// Returns all recorded events in order
    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clears all events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Checks if an event matching the predicate exists
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&E) -> bool,
    {
        self.events.iter().any(predicate)
    }

    /// Counts events matching the predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&E) -> bool,
    {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl<E> Default for AuditLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    enum Probe {
        Ping(u32),
        Pong,
    }

    #[test]
    fn test_record_and_query() {
        let mut log = AuditLog::new();
        assert!(log.is_empty());

        log.record(Probe::Ping(1));
        log.record(Probe::Pong);
        log.record(Probe::Ping(2));

        assert_eq!(log.len(), 3);
        assert!(log.has_event(|e| matches!(e, Probe::Pong)));
        assert_eq!(log.count_events(|e| matches!(e, Probe::Ping(_))), 2);
        assert_eq!(log.events()[2], Probe::Ping(2));
    }

    #[test]
    fn test_clear() {
        let mut log = AuditLog::new();
        log.record(Probe::Pong);
        log.clear();
        assert!(log.is_empty());
        assert!(!log.has_event(|_| true));
    }

    #[test]
    fn test_serializes_as_event_list() {
        let mut log = AuditLog::new();
        log.record(Probe::Ping(7));
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"{"events":[{"Ping":7}]}"#);

        let back: AuditLog<Probe> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
