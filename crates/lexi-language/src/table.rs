//! The supported-language table.
//!
//! Built once at startup (from YAML or the built-in defaults) and shared
//! read-only. Entry order is significant: the resolver breaks ties in favour
//! of the earlier code.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a language table.
#[derive(Debug, Error)]
pub enum LanguageTableError {
    /// The table file could not be read.
    #[error("failed to read language table: {0}")]
    Io(#[from] std::io::Error),

    /// The table file is not valid YAML for this schema.
    #[error("failed to parse language table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The table parsed but is inconsistent.
    #[error("invalid language table: {0}")]
    Invalid(String),
}

/// A language code paired with a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageName {
    /// ISO-style language code, e.g. `en`.
    pub code: String,
    /// Human-readable name.
    pub name: String,
}

impl LanguageName {
    fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_owned(),
            name: name.to_owned(),
        }
    }
}

/// Supported languages with their English names, plus the same languages
/// named in each UI language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTable {
    supported: Vec<LanguageName>,
    #[serde(default)]
    localized: BTreeMap<String, Vec<LanguageName>>,
}

impl LanguageTable {
    /// Builds and validates a table.
    ///
    /// # Errors
    ///
    /// Returns `LanguageTableError::Invalid` if the table is empty, a code or
    /// name is blank, a supported code repeats, or a localized entry names a
    /// code that is not supported.
    pub fn new(
        supported: Vec<LanguageName>,
        localized: BTreeMap<String, Vec<LanguageName>>,
    ) -> Result<Self, LanguageTableError> {
        let table = Self {
            supported,
            localized,
        };
        table.validate()?;
        Ok(table)
    }

    /// Parses a YAML document of the form
    ///
    /// ```yaml
    /// supported:
    ///   - { code: en, name: English }
    /// localized:
    ///   ru:
    ///     - { code: en, name: английский }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the table is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LanguageTableError> {
        let table: Self = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// Reads and parses a YAML table from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LanguageTableError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The built-in table: English, Russian, Spanish, Italian, French,
    /// Belarusian, and Ukrainian, with English and Russian UI names.
    #[must_use]
    pub fn builtin() -> Self {
        let supported = vec![
            LanguageName::new("en", "English"),
            LanguageName::new("ru", "Russian"),
            LanguageName::new("es", "Spanish"),
            LanguageName::new("it", "Italian"),
            LanguageName::new("fr", "French"),
            LanguageName::new("be", "Belarusian"),
            LanguageName::new("uk", "Ukrainian"),
        ];
        let russian = vec![
            LanguageName::new("en", "английский"),
            LanguageName::new("ru", "русский"),
            LanguageName::new("es", "испанский"),
            LanguageName::new("it", "итальянский"),
            LanguageName::new("fr", "французский"),
            LanguageName::new("be", "беларусский"),
            LanguageName::new("uk", "украинский"),
        ];

        let mut localized = BTreeMap::new();
        localized.insert("en".to_owned(), supported.clone());
        localized.insert("ru".to_owned(), russian);

        Self {
            supported,
            localized,
        }
    }

    fn validate(&self) -> Result<(), LanguageTableError> {
        if self.supported.is_empty() {
            return Err(LanguageTableError::Invalid(
                "at least one supported language is required".to_owned(),
            ));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.supported.len());
        for entry in &self.supported {
            if entry.code.trim().is_empty() || entry.name.trim().is_empty() {
                return Err(LanguageTableError::Invalid(
                    "language codes and names must not be blank".to_owned(),
                ));
            }
            if seen.contains(&entry.code.as_str()) {
                return Err(LanguageTableError::Invalid(format!(
                    "duplicate language code `{}`",
                    entry.code
                )));
            }
            seen.push(&entry.code);
        }

        for (ui_language, names) in &self.localized {
            for entry in names {
                if !self.is_supported(&entry.code) {
                    return Err(LanguageTableError::Invalid(format!(
                        "`{ui_language}` names unsupported language `{}`",
                        entry.code
                    )));
                }
                if entry.name.trim().is_empty() {
                    return Err(LanguageTableError::Invalid(format!(
                        "`{ui_language}` has a blank name for `{}`",
                        entry.code
                    )));
                }
            }
        }
        Ok(())
    }

    /// Supported languages with English names, in table order.
    #[must_use]
    pub fn supported(&self) -> &[LanguageName] {
        &self.supported
    }

    /// Supported codes, in table order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(|entry| entry.code.as_str())
    }

    /// Returns `true` if `code` is a supported language.
    #[must_use]
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|entry| entry.code == code)
    }

    /// English name of `code`.
    #[must_use]
    pub fn english_name(&self, code: &str) -> Option<&str> {
        self.supported
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.name.as_str())
    }

    /// Name of `code` in `ui_language`, if the table has one.
    #[must_use]
    pub fn localized_name(&self, code: &str, ui_language: &str) -> Option<&str> {
        self.localized
            .get(ui_language)?
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.name.as_str())
    }

    /// Best display name of `code` for a user whose UI is `ui_language`:
    /// the localized name, then the English name, then the code itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, code: &'a str, ui_language: &str) -> &'a str {
        self.localized_name(code, ui_language)
            .or_else(|| self.english_name(code))
            .unwrap_or(code)
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = LanguageTable::builtin();
        assert!(table.validate().is_ok());
        assert_eq!(
            table.codes().collect::<Vec<_>>(),
            vec!["en", "ru", "es", "it", "fr", "be", "uk"]
        );
    }

    #[test]
    fn test_display_name_falls_back_to_english_then_code() {
        let table = LanguageTable::builtin();
        assert_eq!(table.display_name("fr", "ru"), "французский");
        assert_eq!(table.display_name("fr", "de"), "French");
        assert_eq!(table.display_name("xx", "ru"), "xx");
    }

    #[test]
    fn test_from_yaml_str_preserves_order() {
        let yaml = r"
supported:
  - { code: ru, name: Russian }
  - { code: en, name: English }
localized:
  ru:
    - { code: en, name: английский }
";
        let table = LanguageTable::from_yaml_str(yaml).unwrap();
        assert_eq!(table.codes().collect::<Vec<_>>(), vec!["ru", "en"]);
        assert_eq!(table.localized_name("en", "ru"), Some("английский"));
        assert_eq!(table.localized_name("ru", "ru"), None);
    }

    #[test]
    fn test_from_yaml_str_rejects_duplicate_codes() {
        let yaml = r"
supported:
  - { code: en, name: English }
  - { code: en, name: Anglais }
";
        let err = LanguageTable::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, LanguageTableError::Invalid(_)));
    }

    #[test]
    fn test_from_yaml_str_rejects_unknown_localized_code() {
        let yaml = r"
supported:
  - { code: en, name: English }
localized:
  ru:
    - { code: de, name: немецкий }
";
        let err = LanguageTable::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, LanguageTableError::Invalid(_)));
    }

    #[test]
    fn test_from_yaml_str_rejects_empty_table() {
        let err = LanguageTable::from_yaml_str("supported: []").unwrap_err();
        assert!(matches!(err, LanguageTableError::Invalid(_)));
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let err = LanguageTable::from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, LanguageTableError::Io(_)));
    }
}
