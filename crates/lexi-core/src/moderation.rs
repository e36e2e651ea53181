//! Content gate abstraction.

use async_trait::async_trait;

/// Moderation check applied to user-supplied free text before it is
/// committed into a story.
///
/// Implementations must fail closed: a transport or provider error answers
/// `false`.
#[async_trait]
pub trait ContentGate: Send + Sync {
    /// Returns `true` when `text` is suitable for the audience.
    async fn is_appropriate(&self, text: &str) -> bool;
}

/// Gate used when moderation is switched off in configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllGate;

#[async_trait]
impl ContentGate for AllowAllGate {
    async fn is_appropriate(&self, _text: &str) -> bool {
        true
    }
}
