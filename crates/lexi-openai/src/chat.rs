//! Chat completions adapter.

use async_trait::async_trait;
use lexi_core::llm::{CompletionRequest, LlmClient, LlmError};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::{OpenAiConfig, OpenAiError};

/// `LlmClient` backed by `POST /chat/completions`. Each prompt is sent as a
/// single user message.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    url: String,
}

impl OpenAiClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError` if the API key is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        Ok(Self {
            client: config.build_client()?,
            url: config.endpoint("chat/completions"),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl<'a> From<&'a CompletionRequest> for ChatRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn first_completion(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| LlmError::Parse("response contained no choices".to_owned()))
}

pub(crate) fn transport_error(e: &reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(e.to_string())
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %request.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest::from(request))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Parse(e.to_string())
            }
        })?;
        let completion = first_completion(parsed)?;
        debug!(chars = completion.len(), "completion received");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_has_single_user_message() {
        let request = CompletionRequest {
            model: "gpt-4o-mini".into(),
            prompt: "Tell a story".into(),
            max_tokens: 400,
            temperature: 0.8,
        };

        let body = serde_json::to_value(ChatRequest::from(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 400);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Tell a story");
    }

    #[test]
    fn test_null_content_becomes_empty_string() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();

        assert_eq!(first_completion(response).unwrap(), "");
    }

    #[test]
    fn test_missing_choices_is_parse_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();

        assert!(matches!(
            first_completion(response),
            Err(LlmError::Parse(_))
        ));
    }
}
