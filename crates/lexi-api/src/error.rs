//! Lexi API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lexi_core::error::DomainError;
use lexi_language::LanguageTableError;
use lexi_openai::OpenAiError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The language table could not be loaded.
    #[error("language table error: {0}")]
    Languages(#[from] LanguageTableError),

    /// The `OpenAI` adapters could not be built.
    #[error("openai client error: {0}")]
    OpenAi(#[from] OpenAiError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::ContentRejected(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "content_rejected")
            }
            DomainError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
            DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
