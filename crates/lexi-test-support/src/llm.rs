//! Test LLM clients.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use lexi_core::llm::{CompletionRequest, LlmClient, LlmError};

/// An LLM client that replays scripted completions in order and records
/// every request it receives. Once the script runs out, every call fails
/// with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlmClient {
    /// Create a client that answers with `completions`, in order.
    #[must_use]
    pub fn new<I, S>(completions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(completions.into_iter().map(|c| Ok(c.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a failure to the end of the script.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn then_fail(self, error: LlmError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Returns a snapshot of all requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the prompts of all requests received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".into())))
    }
}

/// An LLM client that always times out. Useful for testing error paths.
#[derive(Debug)]
pub struct FailingLlmClient;

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Timeout)
    }
}
