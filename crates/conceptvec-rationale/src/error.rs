//! Error types for rationale generation.

use thiserror::Error;

/// Result type alias for rationale operations.
pub type Result<T> = std::result::Result<T, RationaleError>;

/// Errors that can occur while requesting a rationale.
///
/// All of these are recoverable from the search engine's point of view:
/// a failed rationale call degrades to a sentinel value, never aborting
/// the search that requested it.
#[derive(Debug, Error)]
pub enum RationaleError {
    /// Error reported by the generative-text service.
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP/network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (missing or rejected credentials).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for RationaleError {
    fn from(e: reqwest::Error) -> Self {
        RationaleError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for RationaleError {
    fn from(e: serde_json::Error) -> Self {
        RationaleError::Serialization(e.to_string())
    }
}
