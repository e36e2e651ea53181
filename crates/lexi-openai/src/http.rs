//! Shared HTTP setup.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use thiserror::Error;

/// Public `OpenAI` API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Connection settings shared by both adapters.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// API root without a trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Settings for the public API with a 60 second timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, OpenAiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| OpenAiError::InvalidApiKey(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(self.timeout))
            .build()
            .map_err(|e| OpenAiError::Client(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let mut config = OpenAiConfig::new("key");
        config.base_url = "http://localhost:8080/v1/".into();

        assert_eq!(
            config.endpoint("chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_api_key_with_newline_is_rejected() {
        let config = OpenAiConfig::new("bad\nkey");

        assert!(matches!(
            config.build_client(),
            Err(OpenAiError::InvalidApiKey(_))
        ));
    }
}
