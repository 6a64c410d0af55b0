//! Indexer error types.

use thiserror::Error;

/// Errors that can occur while talking to the indexer.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// HTTP request failed before a response arrived (connection refused, DNS, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The indexer answered with a non-2xx status.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response body could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    /// Returns `true` if this error is transient and worth retrying.
    ///
    /// Network failures, timeouts, `429` and `5xx` responses are retryable.
    /// Other `4xx` answers and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
