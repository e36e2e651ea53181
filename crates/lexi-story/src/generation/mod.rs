//! Prompt construction, completion parsing, and display formatting.

pub mod format;
pub mod parser;
pub mod prompts;

pub use format::highlight_key_words;
pub use parser::{ParsedStory, extract_key_words, parse_story_response, parse_vocabulary_response};
pub use prompts::{StoryPromptContext, TurnTemplate, select_turn_template};
