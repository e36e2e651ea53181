//! Fuzzy resolution of free-text language input.

use tracing::debug;

use crate::similarity::{partial_ratio, ratio};
use crate::table::LanguageTable;

/// Minimum confidence (0–100) for a fuzzy match to be accepted.
pub const MATCH_THRESHOLD: f64 = 70.0;

const EXACT: f64 = 100.0;

/// Outcome of [`resolve`]. A miss has no code and zero confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageMatch {
    /// The resolved language code, if any.
    pub code: Option<String>,
    /// Similarity score on a 0–100 scale.
    pub confidence: f64,
}

impl LanguageMatch {
    fn hit(code: &str, confidence: f64) -> Self {
        Self {
            code: Some(code.to_owned()),
            confidence,
        }
    }

    fn miss() -> Self {
        Self {
            code: None,
            confidence: 0.0,
        }
    }

    /// Returns `true` if a language was resolved.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.code.is_some()
    }
}

/// Resolves `input` to a supported language code.
///
/// Exact (case-insensitive) matches on a code, an English name, or a name in
/// `ui_language` win outright with confidence 100. Otherwise every supported
/// code is scored against its code, English name, and UI-language name using
/// both [`ratio`] and, for the names, [`partial_ratio`]; the best code is
/// returned if it reaches [`MATCH_THRESHOLD`]. Ties go to the earlier code in
/// table order. Never fails: no match is a normal result.
#[must_use]
pub fn resolve(input: &str, table: &LanguageTable, ui_language: &str) -> LanguageMatch {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return LanguageMatch::miss();
    }

    for entry in table.supported() {
        if needle == entry.code.to_lowercase() || needle == entry.name.to_lowercase() {
            return LanguageMatch::hit(&entry.code, EXACT);
        }
    }

    for code in table.codes() {
        if let Some(name) = table.localized_name(code, ui_language) {
            if needle == name.to_lowercase() {
                return LanguageMatch::hit(code, EXACT);
            }
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for entry in table.supported() {
        let code = entry.code.to_lowercase();
        let english = entry.name.to_lowercase();

        let mut score = ratio(&needle, &code)
            .max(ratio(&needle, &english))
            .max(partial_ratio(&needle, &english));

        if let Some(localized) = table.localized_name(&entry.code, ui_language) {
            let localized = localized.to_lowercase();
            score = score
                .max(ratio(&needle, &localized))
                .max(partial_ratio(&needle, &localized));
        }

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((entry.code.as_str(), score));
        }
    }

    match best {
        Some((code, score)) if score >= MATCH_THRESHOLD => {
            debug!(input, code, score, "fuzzy language match");
            LanguageMatch::hit(code, score)
        }
        _ => LanguageMatch::miss(),
    }
}
