//! Parsing of free-form LLM completions.
//!
//! Every function here is total: malformed input degrades to empty fields
//! rather than an error.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the `N.` prefix that opens a numbered choice.
static CHOICE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("choice prefix pattern is valid"));

/// Matches a word between word boundaries.
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

const KEY_WORD_MIN_CHARS: usize = 6;
const KEY_WORDS_PER_TURN: usize = 2;

const DEFINITION_LABEL: &str = "Definition:";
const TRANSLATION_LABEL: &str = "Translation:";

/// Narrative text and choices split out of a story completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedStory {
    pub story_text: String,
    /// Empty when the completion concludes the story.
    pub choices: Vec<String>,
}

impl ParsedStory {
    /// Returns `true` if the completion carried narrative text. A reply made
    /// only of choices has none.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.story_text.trim().is_empty()
    }
}

/// Splits a story completion into narrative text and choices.
///
/// Lines are trimmed and blank lines dropped. The first line starting with
/// `N.` opens the choices section; every later line is a choice, with its
/// `N.` prefix removed if it has one. Lines before that are the story text,
/// joined with `\n`.
#[must_use]
pub fn parse_story_response(text: &str) -> ParsedStory {
    let mut story_lines = Vec::new();
    let mut choices = Vec::new();
    let mut in_choices = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(prefix) = CHOICE_PREFIX.find(line) {
            in_choices = true;
            choices.push(line[prefix.end()..].trim().to_owned());
        } else if in_choices {
            choices.push(line.to_owned());
        } else {
            story_lines.push(line);
        }
    }

    ParsedStory {
        story_text: story_lines.join("\n"),
        choices,
    }
}

/// Reads `(definition, translation)` from a vocabulary completion.
///
/// The first line starting with each label wins. A missing label yields an
/// empty string.
#[must_use]
pub fn parse_vocabulary_response(text: &str) -> (String, String) {
    let mut definition: Option<&str> = None;
    let mut translation: Option<&str> = None;

    for line in text.lines().map(str::trim) {
        if definition.is_none() {
            if let Some(rest) = line.strip_prefix(DEFINITION_LABEL) {
                definition = Some(rest.trim());
                continue;
            }
        }
        if translation.is_none() {
            if let Some(rest) = line.strip_prefix(TRANSLATION_LABEL) {
                translation = Some(rest.trim());
            }
        }
    }

    (
        definition.unwrap_or_default().to_owned(),
        translation.unwrap_or_default().to_owned(),
    )
}

/// Picks up to two study words from `text`: the first lowercase, purely
/// alphabetic words longer than five characters, in order of appearance.
#[must_use]
pub fn extract_key_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|found| found.as_str())
        .filter(|word| {
            word.chars().count() >= KEY_WORD_MIN_CHARS && word.chars().all(char::is_alphabetic)
        })
        .take(KEY_WORDS_PER_TURN)
        .map(str::to_owned)
        .collect()
}
