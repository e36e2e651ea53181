//! Moderation endpoint adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use lexi_core::moderation::ContentGate;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use crate::chat::transport_error;
use crate::http::{OpenAiConfig, OpenAiError};

/// Categories that reject text even when the provider did not flag it.
pub const BLOCKED_CATEGORIES: [&str; 5] = ["violence", "sexual", "hate", "harassment", "self-harm"];

/// `ContentGate` backed by `POST /moderations`.
///
/// Any transport, status, or decoding failure answers `false`.
#[derive(Debug, Clone)]
pub struct OpenAiModerationGate {
    client: reqwest::Client,
    url: String,
}

impl OpenAiModerationGate {
    /// Builds a gate from `config`.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError` if the API key is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        Ok(Self {
            client: config.build_client()?,
            url: config.endpoint("moderations"),
        })
    }

    async fn moderate(&self, text: &str) -> Result<ModerationResponse, String> {
        let response = self
            .client
            .post(&self.url)
            .json(&ModerationRequest { input: text })
            .send()
            .await
            .map_err(|e| transport_error(&e).to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("moderation endpoint answered {status}"));
        }
        response.json().await.map_err(|e| e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, Option<bool>>,
}

/// Appropriate only if the provider returned a result that is neither
/// flagged nor marked with a blocked category.
fn verdict(response: &ModerationResponse) -> bool {
    let Some(result) = response.results.first() else {
        return false;
    };
    !result.flagged
        && BLOCKED_CATEGORIES
            .iter()
            .all(|category| result.categories.get(*category).copied().flatten() != Some(true))
}

#[async_trait]
impl ContentGate for OpenAiModerationGate {
    #[instrument(skip_all, fields(chars = text.len()))]
    async fn is_appropriate(&self, text: &str) -> bool {
        match self.moderate(text).await {
            Ok(response) => {
                let appropriate = verdict(&response);
                if !appropriate {
                    warn!("content flagged by moderation");
                }
                appropriate
            }
            Err(e) => {
                error!(error = %e, "moderation failed; rejecting content");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ModerationResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_clean_result_is_appropriate() {
        let response = parse(r#"{"results":[{"flagged":false,"categories":{"violence":false}}]}"#);
        assert!(verdict(&response));
    }

    #[test]
    fn test_flagged_result_is_rejected() {
        let response = parse(r#"{"results":[{"flagged":true,"categories":{}}]}"#);
        assert!(!verdict(&response));
    }

    #[test]
    fn test_blocked_category_rejects_unflagged_result() {
        let response = parse(r#"{"results":[{"flagged":false,"categories":{"self-harm":true}}]}"#);
        assert!(!verdict(&response));
    }

    #[test]
    fn test_other_categories_are_ignored() {
        let response =
            parse(r#"{"results":[{"flagged":false,"categories":{"illicit":true,"violence":null}}]}"#);
        assert!(verdict(&response));
    }

    #[test]
    fn test_empty_results_fail_closed() {
        assert!(!verdict(&parse(r#"{"results":[]}"#)));
    }
}
