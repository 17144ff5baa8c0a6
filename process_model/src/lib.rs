//! # Process Model
//!
//! This crate defines the simulated process: its bursts, lifecycle state
//! and metrics, plus the text format processes are defined in.
//!
//! ## Philosophy
//!
//! Processes are plain data. They never schedule themselves; the
//! scheduler drives every state change, so the lifecycle here is a
//! checked state machine rather than a thread.

pub mod burst;
pub mod definition;
pub mod process;
pub mod state;

pub use burst::{Burst, BurstResource};
pub use definition::{
    parse_definition, parse_definitions, Definition, DefinitionError, LineError,
};
pub use process::{Process, ProcessMetrics, UNSET_PRIORITY};
pub use state::ProcessState;
