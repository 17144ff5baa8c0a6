//! # Core Types
//!
//! This crate defines the identifiers shared by every part of the
//! scheduling and paging simulator.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: processes, frames and in-flight operations
//!   are addressed by distinct types and cannot be confused.
//! - **Deterministic ordering**: identifiers that drive iteration order are
//!   totally ordered.
//!
//! ## Key Types
//!
//! - [`ProcessId`]: Name of a simulated process
//! - [`FrameId`]: Index of a physical frame
//! - [`OperationId`]: Unique identifier of an in-flight I/O or fault record
//! - [`AuditLog`]: Typed event log kept by every component

pub mod audit;
pub mod ids;

pub use audit::AuditLog;
pub use ids::{FrameId, OperationId, ProcessId};
