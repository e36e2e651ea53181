//! Lexi `OpenAI` — HTTP adapters for the LLM and content-gate seams.
//!
//! [`OpenAiClient`] implements `LlmClient` over the chat completions
//! endpoint. [`OpenAiModerationGate`] implements `ContentGate` over the
//! moderation endpoint and fails closed.

mod chat;
mod http;
mod moderation;

pub use chat::OpenAiClient;
pub use http::{DEFAULT_BASE_URL, OpenAiConfig, OpenAiError};
pub use moderation::{BLOCKED_CATEGORIES, OpenAiModerationGate};
