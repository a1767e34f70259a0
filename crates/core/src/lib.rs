//! # JobForge Core
//!
//! Job lifecycle services for the JobForge console client.
//!
//! This crate contains:
//! - The [`ConsoleApi`] port implemented by the infra transport
//! - [`JobsService`]: job submission and the polling state machine
//!
//! ## Architecture
//! - Depends only on `jobforge-domain`
//! - No I/O; all network access goes through the port

pub mod jobs;
pub mod ports;

// Re-export commonly used items
pub use jobs::JobsService;
pub use ports::ConsoleApi;
