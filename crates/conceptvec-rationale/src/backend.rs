//! Rationale backend trait and implementations.
//!
//! This module defines the abstraction layer over generative-text providers
//! and provides a mock implementation for deterministic testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{RationaleError, Result};

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures). Non-retryable errors
/// are returned immediately.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    let mut backoff = initial_backoff;

    for attempt in 0..=max_retries {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }

                last_error = Some(e);

                if attempt < max_retries {
                    tracing::warn!(
                        backend = backend_name,
                        attempt = attempt + 1,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap())
}

/// Check if an error is retryable.
///
/// Only network errors are considered retryable. Config, serialization,
/// and other errors should not be retried.
pub fn is_retryable(error: &RationaleError) -> bool {
    matches!(error, RationaleError::Network(_))
}

/// Trait for generative-text providers that can explain an analogy equation.
///
/// Implementations receive the annotated equation string (ids plus "aka"
/// descriptions) and return a free-text explanation. The search engine
/// treats every call as best-effort: errors degrade to a sentinel value.
#[async_trait]
pub trait RationaleBackend: Send + Sync {
    /// Request a natural-language explanation for an equation.
    async fn explain(&self, equation: &str) -> Result<String>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Check if the backend is available and properly configured.
    async fn health_check(&self) -> Result<()>;
}

/// A backend that can be shared across threads.
pub type SharedRationaleBackend = Arc<dyn RationaleBackend>;

/// A mock backend for testing purposes.
///
/// Returns pre-configured responses in order and logs every equation it
/// was asked about, useful for deterministic testing of the search flow.
#[derive(Debug)]
pub struct MockRationaleBackend {
    name: String,
    responses: std::sync::Mutex<Vec<String>>,
    request_log: std::sync::Mutex<Vec<String>>,
    fail: bool,
}

impl MockRationaleBackend {
    /// Create a new mock backend with the given responses.
    ///
    /// Responses are returned in order. If more requests are made than
    /// responses available, an error is returned.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Create a mock backend with a single response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    /// Create a mock backend that fails every request.
    pub fn failing() -> Self {
        Self {
            name: "mock-failing".to_string(),
            responses: std::sync::Mutex::new(Vec::new()),
            request_log: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Get all equations that were sent to this backend.
    pub fn requests(&self) -> Vec<String> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[async_trait]
impl RationaleBackend for MockRationaleBackend {
    async fn explain(&self, equation: &str) -> Result<String> {
        self.request_log.lock().unwrap().push(equation.to_string());

        if self.fail {
            return Err(RationaleError::Backend(
                "MockRationaleBackend: configured to fail".to_string(),
            ));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(RationaleError::Backend(
                "MockRationaleBackend: no more responses available".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        if self.fail {
            Err(RationaleError::Backend("configured to fail".to_string()))
        } else {
            Ok(())
        }
    }
}
