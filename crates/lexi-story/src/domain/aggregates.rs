//! Aggregate root for a story session.

use chrono::{DateTime, Utc};
use lexi_core::error::DomainError;
use lexi_language::LanguageTable;
use serde::{Deserialize, Serialize};

use crate::config::ModelSettings;
use crate::domain::dialog::DialogState;

/// Immutable inputs a story is created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryParams {
    /// Language the story is written in.
    pub target_language_code: String,
    /// The learner's own language, used for translations.
    pub native_language_code: String,
    /// Who the story is about.
    pub protagonist: String,
    /// Where the story takes place.
    pub setting: String,
    /// Model used for story turns.
    pub model: String,
    /// Token ceiling per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl StoryParams {
    /// Validates and builds story parameters.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a text field is blank or either
    /// language code is not in `languages`.
    pub fn new(
        target_language_code: &str,
        native_language_code: &str,
        protagonist: &str,
        setting: &str,
        model: &ModelSettings,
        languages: &LanguageTable,
    ) -> Result<Self, DomainError> {
        for (field, value) in [
            ("target language", target_language_code),
            ("native language", native_language_code),
            ("protagonist", protagonist),
            ("setting", setting),
            ("model", model.model.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!("{field} must not be empty")));
            }
        }
        for code in [target_language_code, native_language_code] {
            if !languages.is_supported(code) {
                return Err(DomainError::Validation(format!(
                    "unsupported language code `{code}`"
                )));
            }
        }

        Ok(Self {
            target_language_code: target_language_code.to_owned(),
            native_language_code: native_language_code.to_owned(),
            protagonist: protagonist.trim().to_owned(),
            setting: setting.trim().to_owned(),
            model: model.model.clone(),
            max_tokens: model.max_tokens,
            temperature: model.temperature,
        })
    }
}

/// Internal pacing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryLogic {
    /// How many more turns may open with a character-growth moment.
    pub character_growth_moments_left: u32,
}

/// The aggregate root for one owner's story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySession {
    /// Identity of the owner (the chat or user).
    pub owner_id: i64,
    /// Creation inputs.
    pub params: StoryParams,
    /// Pacing state.
    pub logic: StoryLogic,
    /// Everything generated so far. Only ever appended to.
    pub story_text: String,
    /// Choices offered by the latest turn. Empty once the story concluded.
    pub choices: Vec<String>,
    /// Key words gathered across all turns.
    pub key_words: Vec<String>,
    /// Number of generation steps taken.
    pub turn_count: u32,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub last_updated: DateTime<Utc>,
}

impl StorySession {
    /// Creates a session at turn 0 with no story yet.
    #[must_use]
    pub fn new(owner_id: i64, params: StoryParams, logic: StoryLogic, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            params,
            logic,
            story_text: String::new(),
            choices: Vec::new(),
            key_words: Vec::new(),
            turn_count: 0,
            created_at: now,
            last_updated: now,
        }
    }

    /// Applies one generation step: appends `text`, replaces the pending
    /// choices, appends `key_words`, and advances the turn counter.
    pub fn record_turn(
        &mut self,
        text: &str,
        choices: Vec<String>,
        key_words: &[String],
        now: DateTime<Utc>,
    ) {
        if !self.story_text.is_empty() {
            self.story_text.push_str("\n\n");
        }
        self.story_text.push_str(text);
        self.choices = choices;
        self.key_words.extend_from_slice(key_words);
        self.turn_count += 1;
        self.last_updated = now;
    }

    /// Returns `true` once a turn produced no choices.
    #[must_use]
    pub fn is_concluded(&self) -> bool {
        self.turn_count > 0 && self.choices.is_empty()
    }

    /// The dialog state this session represents.
    #[must_use]
    pub fn dialog_state(&self) -> DialogState {
        if self.is_concluded() {
            DialogState::Concluded
        } else {
            DialogState::Active {
                turn: self.turn_count,
            }
        }
    }

    /// Looks up the pending choice with the 1-based identifier `choice_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the story is over or the
    /// identifier does not name a pending choice.
    pub fn choice(&self, choice_id: &str) -> Result<&str, DomainError> {
        if self.is_concluded() {
            return Err(DomainError::Validation(
                "the story has concluded; no choices remain".to_owned(),
            ));
        }
        choice_id
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.choices.get(index))
            .map(String::as_str)
            .ok_or_else(|| DomainError::Validation(format!("invalid choice `{choice_id}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params() -> StoryParams {
        StoryParams::new(
            "es",
            "en",
            "a brave cat",
            "a lighthouse",
            &ModelSettings {
                model: "gpt-4o-mini".into(),
                max_tokens: 400,
                temperature: 0.8,
            },
            &LanguageTable::builtin(),
        )
        .unwrap()
    }

    fn session() -> StorySession {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        StorySession::new(
            42,
            params(),
            StoryLogic {
                character_growth_moments_left: 1,
            },
            now,
        )
    }

    #[test]
    fn test_params_reject_unsupported_language() {
        let result = StoryParams::new(
            "de",
            "en",
            "a cat",
            "a house",
            &crate::config::StoryConfig::default().story_model,
            &LanguageTable::builtin(),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_params_reject_blank_protagonist() {
        let result = StoryParams::new(
            "es",
            "en",
            "   ",
            "a house",
            &crate::config::StoryConfig::default().story_model,
            &LanguageTable::builtin(),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_new_session_starts_at_turn_zero() {
        let session = session();
        assert_eq!(session.turn_count, 0);
        assert!(session.story_text.is_empty());
        assert!(!session.is_concluded());
        assert_eq!(session.dialog_state(), DialogState::Active { turn: 0 });
    }

    #[test]
    fn test_record_turn_appends_and_replaces() {
        // Arrange
        let mut session = session();
        let later = Utc.with_ymd_and_hms(2026, 1, 15, 10, 5, 0).unwrap();

        // Act
        session.record_turn(
            "Once upon a time.",
            vec!["Run".into(), "Hide".into()],
            &["upon".into()],
            later,
        );
        session.record_turn("Then it rained.", vec!["Swim".into()], &["rained".into()], later);

        // Assert
        assert_eq!(session.story_text, "Once upon a time.\n\nThen it rained.");
        assert_eq!(session.choices, vec!["Swim".to_owned()]);
        assert_eq!(session.key_words, vec!["upon".to_owned(), "rained".to_owned()]);
        assert_eq!(session.turn_count, 2);
        assert_eq!(session.last_updated, later);
    }

    #[test]
    fn test_turn_without_choices_concludes() {
        let mut session = session();
        session.record_turn("The end.", Vec::new(), &[], session.created_at);

        assert!(session.is_concluded());
        assert_eq!(session.dialog_state(), DialogState::Concluded);
        assert!(matches!(session.choice("1"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_choice_ids_are_one_based() {
        let mut session = session();
        session.record_turn("Text.", vec!["Left".into(), "Right".into()], &[], session.created_at);

        assert_eq!(session.choice("1").unwrap(), "Left");
        assert_eq!(session.choice(" 2 ").unwrap(), "Right");
        assert!(session.choice("0").is_err());
        assert!(session.choice("3").is_err());
        assert!(session.choice("left").is_err());
    }

    #[test]
    fn test_session_survives_json_round_trip() {
        let session = session();
        let value = serde_json::to_value(&session).unwrap();
        let restored: StorySession = serde_json::from_value(value).unwrap();
        assert_eq!(restored, session);
    }
}
