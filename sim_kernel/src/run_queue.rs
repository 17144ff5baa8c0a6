//! Ready queue

use core_types::ProcessId;
use std::collections::VecDeque;

/// Ordered queue of READY processes
///
/// Processes are appended at the back and dispatched from the front;
/// preemption puts a process back at the front. Key-based selection scans
/// in queue order and keeps the first strict minimum, so ties go to the
/// earliest-enqueued process.
#[derive(Debug, Clone, Default)]
pub struct RunQueue {
    queue: VecDeque<ProcessId>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, pid: ProcessId) {
        self.queue.push_back(pid);
    }

    pub fn push_front(&mut self, pid: ProcessId) {
        self.queue.push_front(pid);
    }

    pub fn pop_front(&mut self) -> Option<ProcessId> {
        self.queue.pop_front()
    }

    /// Index of the first entry with the smallest key
    ///
    /// Entries whose key is None are skipped.
    fn first_min_index<K, F>(&self, key_of: F) -> Option<usize>
    where
        K: Ord,
        F: Fn(&ProcessId) -> Option<K>,
    {
        let mut best: Option<(usize, K)> = None;
        for (index, pid) in self.queue.iter().enumerate() {
            let Some(key) = key_of(pid) else {
                continue;
            };
            let better = match &best {
                Some((_, best_key)) => key < *best_key,
                None => true,
            };
            if better {
                best = Some((index, key));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Returns the first entry with the smallest key without removing it
    pub fn peek_first_min_by_key<K, F>(&self, key_of: F) -> Option<&ProcessId>
    where
        K: Ord,
        F: Fn(&ProcessId) -> Option<K>,
    {
        self.first_min_index(key_of)
            .and_then(|index| self.queue.get(index))
    }

    /// Removes and returns the first entry with the smallest key
    pub fn take_first_min_by_key<K, F>(&mut self, key_of: F) -> Option<ProcessId>
    where
        K: Ord,
        F: Fn(&ProcessId) -> Option<K>,
    {
        self.first_min_index(key_of)
            .and_then(|index| self.queue.remove(index))
    }

    /// Removes `pid`, returning whether it was queued
    pub fn remove(&mut self, pid: &ProcessId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|queued| queued != pid);
        self.queue.len() != before
    }

    pub fn contains(&self, pid: &ProcessId) -> bool {
        self.queue.contains(pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessId> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
