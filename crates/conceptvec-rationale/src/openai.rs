//! OpenAI API backend implementation.
//!
//! This module provides the `OpenAiBackend` which connects to OpenAI's
//! chat-completions API (or any compatible endpoint) to generate rationales.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{RationaleBackend, with_retry};
use crate::error::{RationaleError, Result};
use crate::prompts::{ChatMessage, build_explain_messages};

/// Default OpenAI API base URL.
const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default model for rationale generation.
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Configuration for the OpenAI backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model to use for completions.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Cap on generated tokens.
    pub max_tokens: Option<u32>,
}

impl OpenAiConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create config from environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RationaleError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// OpenAI chat-completions backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                RationaleError::Internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Create a backend from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Build the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    /// Add authentication headers to a request.
    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
    }

    fn to_chat_request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Handle a successful response.
    async fn handle_response(response: Response) -> Result<String> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RationaleError::Serialization(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                RationaleError::Backend("Response contained no text content".to_string())
            })
    }

    /// Handle an error response.
    async fn handle_error_response(response: Response) -> RationaleError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
            match status.as_u16() {
                401 => {
                    RationaleError::Config(format!("Authentication failed: {}", error.error.message))
                }
                429 => {
                    RationaleError::Backend(format!("Rate limit exceeded: {}", error.error.message))
                }
                500..=599 => {
                    RationaleError::Backend(format!("Server error: {}", error.error.message))
                }
                _ => RationaleError::Backend(error.error.message),
            }
        } else {
            RationaleError::Backend(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl RationaleBackend for OpenAiBackend {
    async fn explain(&self, equation: &str) -> Result<String> {
        let request = self.to_chat_request(build_explain_messages(equation));

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            equation = %equation,
            "Requesting rationale"
        );

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            "openai",
            || async {
                let response = self
                    .add_headers(self.client.post(self.completions_url()))
                    .json(&request)
                    .send()
                    .await?;

                Self::handle_response(response).await
            },
        )
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<()> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user("ping")],
            temperature: None,
            max_tokens: Some(1),
        };

        let response = self
            .add_headers(self.client.post(self.completions_url()))
            .json(&request)
            .send()
            .await?;

        match Self::handle_response(response).await {
            Ok(_) => Ok(()),
            Err(RationaleError::Backend(msg)) if msg.contains("Rate limit") => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Create a shared OpenAI backend.
pub fn create_shared_backend(config: OpenAiConfig) -> Result<Arc<dyn RationaleBackend>> {
    Ok(Arc::new(OpenAiBackend::new(config)?))
}

// ============================================================================
// Request/Response types for the chat-completions API
// ============================================================================

#[derive(Debug, serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    message: String,
}
