//! Namespaced storage keys.
//!
//! Every value in the session store lives under a key made of a fixed prefix
//! and one or more identity parts. Prefixes are distinct per record kind and
//! parts are escaped, so keys from different namespaces can never collide.

use std::fmt;

const SESSION_PREFIX: &str = "story_session";
const DIALOG_PREFIX: &str = "dialog";
const PREFERENCE_PREFIX: &str = "preference";
const VOCABULARY_PREFIX: &str = "vocabulary";

/// A deterministic, collision-free key into the session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    prefix: &'static str,
    parts: Vec<String>,
}

impl StorageKey {
    /// Key of the live story session of `owner_id`.
    #[must_use]
    pub fn story_session(owner_id: i64) -> Self {
        Self::new(SESSION_PREFIX, vec![owner_id.to_string()])
    }

    /// Key of the onboarding dialog state of `owner_id`.
    #[must_use]
    pub fn dialog(owner_id: i64) -> Self {
        Self::new(DIALOG_PREFIX, vec![owner_id.to_string()])
    }

    /// Key of the remembered story language of `owner_id`.
    #[must_use]
    pub fn preference(owner_id: i64) -> Self {
        Self::new(PREFERENCE_PREFIX, vec![owner_id.to_string()])
    }

    /// Key of a cached vocabulary entry.
    #[must_use]
    pub fn vocabulary(word: &str, target_language: &str, native_language: &str) -> Self {
        Self::new(
            VOCABULARY_PREFIX,
            vec![
                word.to_owned(),
                target_language.to_owned(),
                native_language.to_owned(),
            ],
        )
    }

    fn new(prefix: &'static str, parts: Vec<String>) -> Self {
        Self { prefix, parts }
    }

    /// Returns the namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Renders the key as a single string, e.g. `vocabulary:gato:es:en`.
    #[must_use]
    pub fn pack(&self) -> String {
        let mut packed = String::from(self.prefix);
        for part in &self.parts {
            packed.push(':');
            packed.push_str(&escape(part));
        }
        packed
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pack())
    }
}

fn escape(part: &str) -> String {
    part.replace('%', "%25").replace(':', "%3A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_has_owner_suffix() {
        assert_eq!(StorageKey::story_session(42).pack(), "story_session:42");
        assert_eq!(StorageKey::dialog(-7).pack(), "dialog:-7");
    }

    #[test]
    fn test_vocabulary_key_joins_all_parts() {
        let key = StorageKey::vocabulary("gato", "es", "en");
        assert_eq!(key.pack(), "vocabulary:gato:es:en");
        assert_eq!(key.prefix(), "vocabulary");
    }

    #[test]
    fn test_separator_inside_a_part_cannot_forge_another_key() {
        let tricky = StorageKey::vocabulary("a:b", "c", "d");
        let plain = StorageKey::vocabulary("a", "b:c", "d");
        assert_ne!(tricky.pack(), plain.pack());
        assert_eq!(tricky.pack(), "vocabulary:a%3Ab:c:d");
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let session = StorageKey::story_session(1).pack();
        let dialog = StorageKey::dialog(1).pack();
        let preference = StorageKey::preference(1).pack();
        let vocabulary = StorageKey::vocabulary("1", "1", "1").pack();
        let all = [session, dialog, preference, vocabulary];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
