//! Lexi Core — shared abstractions for the story engine.
//!
//! This crate defines the traits and types every other crate depends on:
//! time, randomness, persistence, the LLM and moderation collaborators, and
//! the error taxonomy. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod key;
pub mod llm;
pub mod moderation;
pub mod rng;
pub mod store;
