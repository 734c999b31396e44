//! conceptvec-rationale: Rationale annotation for analogy search results
//!
//! This crate provides the external-collaborator side of the analogy
//! explorer: given an annotated equation string, it asks a generative-text
//! service to reason about why the analogy could hold biologically.
//!
//! The service is reached through the [`RationaleBackend`] trait so that the
//! search engine stays independent of any concrete provider, and tests can
//! substitute [`MockRationaleBackend`].

pub mod backend;
pub mod error;
pub mod openai;
pub mod prompts;

pub use backend::{
    MockRationaleBackend, RationaleBackend, SharedRationaleBackend, is_retryable, with_retry,
};
pub use error::{RationaleError, Result};
pub use openai::{OpenAiBackend, OpenAiConfig, create_shared_backend};
pub use prompts::{ChatMessage, build_explain_messages};
