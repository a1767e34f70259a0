//! Configuration loader
//!
//! Loads [`ConsoleConfig`] from environment variables.
//!
//! ## Environment Variables
//! - `JOBFORGE_SERVER_URL`: console base URL (required)
//! - `JOBFORGE_API_KEY`: API key or password (required)
//! - `JOBFORGE_USERNAME`: account name; presence switches auth to HTTP Basic
//! - `JOBFORGE_TIMEOUT_SECS`: per-request timeout, default 30
//! - `JOBFORGE_POLL_INTERVAL_SECS`: job poll cadence, default 10

use jobforge_domain::{ConsoleConfig, TransportError, TransportResult};

/// Load configuration from environment variables.
///
/// # Errors
/// Returns `TransportError::Config` if a required variable is missing or a
/// numeric one does not parse.
pub fn load_from_env() -> TransportResult<ConsoleConfig> {
    let server_url = env_var("JOBFORGE_SERVER_URL")?;
    let api_key = env_var("JOBFORGE_API_KEY")?;
    let username = std::env::var("JOBFORGE_USERNAME").ok().filter(|v| !v.trim().is_empty());

    let mut config = ConsoleConfig::new(server_url, api_key);
    config.username = username;
    if let Some(timeout) = env_u64("JOBFORGE_TIMEOUT_SECS")? {
        config.timeout_secs = timeout;
    }
    if let Some(interval) = env_u64("JOBFORGE_POLL_INTERVAL_SECS")? {
        config.poll_interval_secs = interval;
    }

    config.validate()?;
    tracing::debug!(server_url = %config.server_url, "configuration loaded from environment");
    Ok(config)
}

fn env_var(name: &str) -> TransportResult<String> {
    std::env::var(name)
        .map_err(|_| TransportError::Config(format!("missing environment variable {}", name)))
}

fn env_u64(name: &str) -> TransportResult<Option<u64>> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|e| TransportError::Config(format!("invalid value for {}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; each one uses its own variable
    // names to stay independent of test ordering.

    #[test]
    fn missing_required_variable_is_a_config_error() {
        std::env::remove_var("JOBFORGE_SERVER_URL");
        let result = load_from_env();
        assert!(matches!(result, Err(TransportError::Config(_))));
    }

    #[test]
    fn parses_optional_numeric_variable() {
        std::env::set_var("JOBFORGE_TEST_TIMEOUT", "45");
        assert_eq!(env_u64("JOBFORGE_TEST_TIMEOUT").unwrap(), Some(45));
        std::env::remove_var("JOBFORGE_TEST_TIMEOUT");

        assert_eq!(env_u64("JOBFORGE_TEST_ABSENT").unwrap(), None);
    }

    #[test]
    fn rejects_non_numeric_value() {
        std::env::set_var("JOBFORGE_TEST_BAD_TIMEOUT", "soon");
        assert!(env_u64("JOBFORGE_TEST_BAD_TIMEOUT").is_err());
        std::env::remove_var("JOBFORGE_TEST_BAD_TIMEOUT");
    }
}
