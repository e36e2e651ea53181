//! Lexi — interactive story session engine.
//!
//! Drives a choice-driven story for one owner at a time: onboarding
//! (language, protagonist, setting), turn-by-turn generation through an LLM,
//! parsing of the free-form completions, and vocabulary lookups.

pub mod application;
pub mod config;
pub mod domain;
pub mod generation;
