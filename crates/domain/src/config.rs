//! Configuration structures
//!
//! Typed configuration for a console client session. Loading from the
//! environment lives in the infra crate; validation lives here.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_POLL_INTERVAL_SECS;
use crate::errors::TransportError;

/// Connection settings for one console session.
///
/// Credentials are immutable once a session begins; changing them requires
/// building a new client and logging in again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Console base URL (e.g. "https://console.example.com:8081")
    pub server_url: String,
    /// API key, or the account password when `username` is set
    pub api_key: String,
    /// Optional username; presence switches auth to HTTP Basic
    #[serde(default)]
    pub username: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between job status polls in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl ConsoleConfig {
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: api_key.into(),
            username: None,
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Check that the fields a session cannot start without are present.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.server_url.trim().is_empty() {
            return Err(TransportError::Config("server URL must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(TransportError::Config("API key must not be empty".into()));
        }
        Ok(())
    }
}
