//! Lexi — language table and fuzzy language resolution.
//!
//! Onboarding asks the user which language they want to learn as free text
//! ("english", "rus", "французский"). This crate maps that text onto a
//! supported language code.

pub mod resolver;
pub mod similarity;
pub mod table;

pub use resolver::{LanguageMatch, MATCH_THRESHOLD, resolve};
pub use table::{LanguageName, LanguageTable, LanguageTableError};
