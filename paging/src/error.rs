//! Memory configuration errors

use thiserror::Error;

/// Errors raised while building a memory manager
///
/// Faults during simulation are not errors; they are reported through the
/// boolean results of `load_page` and `ensure_pages`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Frame count must be positive")]
    NoFrames,

    #[error("Unknown replacement algorithm: {0}")]
    UnknownAlgorithm(String),
}
