//! # JobForge Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The authenticated HTTP transport ([`http::RestClient`])
//! - Session state (credentials + anti-forgery token)
//! - Environment configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `jobforge-core`
//! - Contains all "impure" code (network I/O, environment access)

pub mod config;
pub mod http;

// Re-export commonly used items
pub use http::*;
