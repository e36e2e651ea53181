//! Application layer: the story engine and its read-side queries.

pub mod command_handlers;
pub mod query_handlers;
pub mod vocabulary;

pub use command_handlers::StoryEngine;
