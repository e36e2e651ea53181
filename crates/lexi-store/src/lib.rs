//! Session store implementations for the Lexi story engine.

pub mod memory;

pub use memory::InMemorySessionStore;
