//! Error types for the analogy search engine.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during a search invocation.
///
/// These are per-request failures surfaced to the caller as structured
/// payloads, never process aborts. Rationale-service failures are not
/// represented here at all: they degrade to a sentinel inside the search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query id is absent from the store. Detected before any
    /// sampling work begins.
    #[error("Query concept not found: {0}")]
    QueryNotFound(String),

    /// The store has too few concepts to guarantee a post-filter
    /// survivor among the top-k candidates.
    #[error("Store has {size} concepts but at least {required} are required")]
    StoreTooSmall { size: usize, required: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::QueryNotFound("Gene_999".to_string());
        assert_eq!(err.to_string(), "Query concept not found: Gene_999");

        let err = SearchError::StoreTooSmall {
            size: 2,
            required: 4,
        };
        assert!(err.to_string().contains("2 concepts"));
        assert!(err.to_string().contains("4"));
    }
}
