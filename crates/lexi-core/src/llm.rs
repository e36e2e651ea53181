//! LLM client abstraction.
//!
//! The engine only needs "prompt in, completion text out". Transport,
//! authentication, and timeouts belong to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider model name.
    pub model: String,
    /// The full prompt text, sent as a single user message.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Failures reported by an [`LlmClient`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the client timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("provider error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or provider message.
        message: String,
    },

    /// The provider response could not be decoded.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl From<LlmError> for DomainError {
    fn from(err: LlmError) -> Self {
        DomainError::Generation(err.to_string())
    }
}

/// Text completion collaborator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `request` and returns the completion text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
