//! Driver errors

use paging::MemoryError;
use sim_kernel::SchedulerError;
use std::path::PathBuf;
use thiserror::Error;

/// Driver error types
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
}
