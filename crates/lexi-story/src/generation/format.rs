//! Display helpers.

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Wraps every case-insensitive occurrence of each key word in `**`.
///
/// Words are processed in order and each replacement uses the key word's own
/// spelling.
#[must_use]
pub fn highlight_key_words(text: &str, key_words: &[String]) -> String {
    let mut formatted = text.to_owned();
    for word in key_words.iter().filter(|word| !word.is_empty()) {
        let Some(pattern) = word_pattern(word) else {
            continue;
        };
        formatted = pattern
            .replace_all(&formatted, regex::NoExpand(&format!("**{word}**")))
            .into_owned();
    }
    formatted
}

fn word_pattern(word: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(word))
        .case_insensitive(true)
        .build()
        .inspect_err(|e| debug!(word, error = %e, "skipping key word that does not compile"))
        .ok()
}
