//! Test content gate.

use std::sync::Mutex;

use async_trait::async_trait;
use lexi_core::moderation::ContentGate;

/// A content gate with a fixed verdict that records what it was asked.
#[derive(Debug)]
pub struct StubContentGate {
    verdict: bool,
    checked: Mutex<Vec<String>>,
}

impl StubContentGate {
    /// A gate that approves everything.
    #[must_use]
    pub fn approving() -> Self {
        Self::with_verdict(true)
    }

    /// A gate that rejects everything.
    #[must_use]
    pub fn rejecting() -> Self {
        Self::with_verdict(false)
    }

    fn with_verdict(verdict: bool) -> Self {
        Self {
            verdict,
            checked: Mutex::new(Vec::new()),
        }
    }

    /// Returns every text checked so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGate for StubContentGate {
    async fn is_appropriate(&self, text: &str) -> bool {
        self.checked.lock().unwrap().push(text.to_owned());
        self.verdict
    }
}
