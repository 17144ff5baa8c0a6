//! CPU and I/O bursts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource a burst consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurstResource {
    Cpu,
    Io,
}

impl fmt::Display for BurstResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurstResource::Cpu => f.write_str("CPU"),
            BurstResource::Io => f.write_str("IO"),
        }
    }
}

/// A contiguous span of CPU or I/O demand
///
/// The resource and total duration never change; `remaining` counts down
/// one unit per cycle while the burst is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burst {
    resource: BurstResource,
    total: u64,
    remaining: u64,
}

impl Burst {
    /// Creates a burst with its full duration remaining
    pub fn new(resource: BurstResource, total: u64) -> Self {
        Self {
            resource,
            total,
            remaining: total,
        }
    }

    /// Creates a CPU burst
    pub fn cpu(total: u64) -> Self {
        Self::new(BurstResource::Cpu, total)
    }

    /// Creates an I/O burst
    pub fn io(total: u64) -> Self {
        Self::new(BurstResource::Io, total)
    }

    pub fn resource(&self) -> BurstResource {
        self.resource
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// A zero-length burst would never be scheduled
    pub fn is_valid(&self) -> bool {
        self.total > 0
    }

    /// Consumes one time unit, saturating at zero
    pub fn consume_unit(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

impl fmt::Display for Burst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.resource, self.total)
    }
}
