//! Domain error types.

use thiserror::Error;

/// Top-level error type returned by every engine operation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or unsupported input: unknown language, missing onboarding
    /// field, invalid choice, or input that does not fit the current state.
    #[error("validation error: {0}")]
    Validation(String),

    /// The content gate declined user-supplied text.
    #[error("content rejected: {0}")]
    ContentRejected(String),

    /// The LLM call or the session store failed, or the model returned
    /// nothing usable.
    #[error("generation error: {0}")]
    Generation(String),

    /// No live session (or onboarding dialog) exists for the owner.
    #[error("session not found for owner {0}")]
    SessionNotFound(i64),
}
