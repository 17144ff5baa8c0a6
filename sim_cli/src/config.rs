//! Simulation configuration
//!
//! Loaded from JSON, then overridden by command-line flags.

use crate::CliError;
use paging::{MemoryConfig, ReplacementKind};
use serde::{Deserialize, Serialize};
use sim_kernel::{SchedulerConfig, SchedulingAlgorithm};
use std::fs;
use std::path::Path;

/// Full driver configuration
///
/// ```json
/// {
///   "scheduler": { "algorithm": "RR", "quantum": 3 },
///   "memory": { "total_frames": 4, "replacement": "LRU" },
///   "max_cycles": 100,
///   "idle_cycle_limit": 3
/// }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scheduler: SchedulerConfig,
    pub memory: MemoryConfig,
    /// Maximum cycles to run (0 = unlimited)
    pub max_cycles: u64,
    /// Consecutive cycles without work before stopping
    pub idle_cycle_limit: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            memory: MemoryConfig::default(),
            max_cycles: 50,
            idle_cycle_limit: 3,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Checks the values the scheduler and memory manager would reject
    pub fn validate(&self) -> Result<(), CliError> {
        self.scheduler.validate()?;
        if self.memory.total_frames == 0 {
            return Err(paging::MemoryError::NoFrames.into());
        }
        Ok(())
    }
}

/// Flag values that replace configuration fields
///
/// Kept as raw strings until [`Overrides::apply`] so a config file can be
/// named anywhere on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub algorithm: Option<String>,
    pub quantum: Option<String>,
    pub frames: Option<String>,
    pub replacement: Option<String>,
    pub max_cycles: Option<String>,
    pub idle_limit: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut SimulationConfig) -> Result<(), CliError> {
        if let Some(value) = &self.algorithm {
            config.scheduler.algorithm = value.parse::<SchedulingAlgorithm>()?;
        }
        if let Some(value) = &self.quantum {
            config.scheduler.quantum = parse_flag("--quantum", value)?;
        }
        if let Some(value) = &self.frames {
            config.memory.total_frames = parse_flag("--frames", value)?;
        }
        if let Some(value) = &self.replacement {
            config.memory.replacement = value.parse::<ReplacementKind>()?;
        }
        if let Some(value) = &self.max_cycles {
            config.max_cycles = parse_flag("--max-cycles", value)?;
        }
        if let Some(value) = &self.idle_limit {
            config.idle_cycle_limit = parse_flag("--idle-limit", value)?;
        }
        Ok(())
    }
}

fn parse_flag<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}
