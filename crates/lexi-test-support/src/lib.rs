//! Shared test doubles for the Lexi story engine.

mod clock;
mod llm;
mod moderation;
mod rng;
mod store;

pub use clock::{FixedClock, ManualClock};
pub use llm::{FailingLlmClient, ScriptedLlmClient};
pub use moderation::StubContentGate;
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingSessionStore, ReadOnlySessionStore, SelectiveFailureStore};
