//! # Scheduler Simulation Driver
//!
//! Host side of the simulation: reads process definitions, builds the
//! scheduler from a [`SimulationConfig`], paces cycles and renders results.
//!
//! ## Responsibilities
//!
//! - Load configuration (JSON file, then flag overrides)
//! - Register processes parsed from a definition file
//! - Run cycles until the cycle limit or an idle streak
//! - Render the report, the timeline and the audit trace
//!
//! The simulation crates never print; everything user-facing lives here.

pub mod config;
pub mod error;
pub mod render;
pub mod runner;

pub use config::{Overrides, SimulationConfig};
pub use error::CliError;
pub use render::{render_report, render_timeline, render_trace};
pub use runner::{Simulation, StopReason};
