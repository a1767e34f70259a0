//! # JobForge Domain
//!
//! Domain types and models for the JobForge console client.
//!
//! This crate contains:
//! - Job lifecycle types (requests, handles, status snapshots)
//! - Error taxonomy (`TransportError`, `JobServiceError`)
//! - Configuration structures
//! - Wire constants (header names, parameter keys, step names)
//!
//! ## Architecture
//! - No dependencies on other JobForge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
