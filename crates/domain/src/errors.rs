//! Error types used throughout the client

use thiserror::Error;

/// Failures crossing the authenticated transport boundary.
///
/// This is the only error kind the transport layer produces; the job
/// services wrap it in [`JobServiceError`].
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network-level I/O failure (connect, timeout, broken stream).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a status outside the accepted set.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A request entity could not be serialized to JSON.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Client construction or configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransportError {
    /// Status code carried by [`TransportError::UnexpectedStatus`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures surfaced by job submission and polling.
#[derive(Error, Debug)]
pub enum JobServiceError {
    /// Underlying transport failure during submission or a poll. Never
    /// retried; a transient blip mid-wait fails the whole wait.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Caller bug: a required field was missing before any network call.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// The server accepted the call but returned no usable body where one
    /// was required.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The wait was aborted through the caller's cancellation token.
    #[error("Operation canceled by caller")]
    Canceled,
}

/// Result alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Result alias for job service operations
pub type JobResult<T> = std::result::Result<T, JobServiceError>;
