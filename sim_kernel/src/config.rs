//! Scheduling policy selection

use crate::SchedulerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CPU scheduling discipline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchedulingAlgorithm {
    /// First come, first served
    #[default]
    Fcfs,
    /// Shortest remaining burst first, preemptive
    Sjf,
    /// Round robin with a fixed quantum
    Rr,
    /// Lowest priority value first, preemptive
    Priority,
}

impl SchedulingAlgorithm {
    /// Checks if the running process is compared against the ready queue every cycle
    pub fn is_preemptive(self) -> bool {
        matches!(self, SchedulingAlgorithm::Sjf | SchedulingAlgorithm::Priority)
    }

    /// Checks if selection takes the queue head rather than a minimum
    pub fn is_queue_order(self) -> bool {
        matches!(self, SchedulingAlgorithm::Fcfs | SchedulingAlgorithm::Rr)
    }
}

impl FromStr for SchedulingAlgorithm {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcfs" => Ok(SchedulingAlgorithm::Fcfs),
            "sjf" => Ok(SchedulingAlgorithm::Sjf),
            "rr" | "round-robin" => Ok(SchedulingAlgorithm::Rr),
            "priority" => Ok(SchedulingAlgorithm::Priority),
            _ => Err(SchedulerError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulingAlgorithm::Fcfs => "FCFS",
            SchedulingAlgorithm::Sjf => "SJF",
            SchedulingAlgorithm::Rr => "RR",
            SchedulingAlgorithm::Priority => "PRIORITY",
        };
        f.write_str(name)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub algorithm: SchedulingAlgorithm,
    /// Round-robin time slice in cycles
    pub quantum: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            algorithm: SchedulingAlgorithm::Fcfs,
            quantum: 2,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.quantum == 0 {
            return Err(SchedulerError::ZeroQuantum);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.algorithm, SchedulingAlgorithm::Fcfs);
        assert_eq!(config.quantum, 2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let config = SchedulerConfig {
            quantum: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.validate(), Err(SchedulerError::ZeroQuantum));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("FCFS".parse(), Ok(SchedulingAlgorithm::Fcfs));
        assert_eq!("sjf".parse(), Ok(SchedulingAlgorithm::Sjf));
        assert_eq!("Round-Robin".parse(), Ok(SchedulingAlgorithm::Rr));
        assert_eq!("priority".parse(), Ok(SchedulingAlgorithm::Priority));
        assert!(matches!(
            "lottery".parse::<SchedulingAlgorithm>(),
            Err(SchedulerError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_algorithm_properties() {
        assert!(SchedulingAlgorithm::Priority.is_preemptive());
        assert!(SchedulingAlgorithm::Sjf.is_preemptive());
        assert!(!SchedulingAlgorithm::Rr.is_preemptive());
        assert!(SchedulingAlgorithm::Rr.is_queue_order());
        assert_eq!(SchedulingAlgorithm::Rr.to_string(), "RR");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"algorithm":"RR"}"#).unwrap();
        assert_eq!(config.algorithm, SchedulingAlgorithm::Rr);
        assert_eq!(config.quantum, 2);
    }
}
