//! Query handlers: read-only views of an owner's story.

use chrono::{DateTime, Utc};
use lexi_core::error::DomainError;
use lexi_core::key::StorageKey;
use lexi_core::store::{SessionStore, get_json};
use serde::Serialize;

use crate::domain::aggregates::StorySession;
use crate::domain::dialog::{Dialog, DialogState};
use crate::domain::outputs::StoryChoice;
use crate::generation::format::highlight_key_words;

/// Read-only view of a story session.
#[derive(Debug, Serialize)]
pub struct StorySessionView {
    pub owner_id: i64,
    pub state: DialogState,
    pub target_language_code: String,
    pub native_language_code: String,
    pub protagonist: String,
    pub setting: String,
    /// Full story so far.
    pub story_text: String,
    /// `story_text` with key words wrapped in `**`.
    pub highlighted_text: String,
    /// Choices of the latest turn.
    pub choices: Vec<StoryChoice>,
    pub key_words: Vec<String>,
    pub turn_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl From<StorySession> for StorySessionView {
    fn from(session: StorySession) -> Self {
        let state = session.dialog_state();
        let highlighted_text = highlight_key_words(&session.story_text, &session.key_words);
        let choices = StoryChoice::numbered(&session.choices);
        Self {
            owner_id: session.owner_id,
            state,
            target_language_code: session.params.target_language_code,
            native_language_code: session.params.native_language_code,
            protagonist: session.params.protagonist,
            setting: session.params.setting,
            story_text: session.story_text,
            highlighted_text,
            choices,
            key_words: session.key_words,
            turn_count: session.turn_count,
            created_at: session.created_at,
            last_updated: session.last_updated,
        }
    }
}

/// Loads the live story session of `owner_id`.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the owner has no live session.
/// Returns `DomainError::Generation` if the store fails.
pub async fn get_story_session(
    owner_id: i64,
    store: &dyn SessionStore,
) -> Result<StorySession, DomainError> {
    get_json(store, &StorageKey::story_session(owner_id))
        .await?
        .ok_or(DomainError::SessionNotFound(owner_id))
}

/// Returns a view of the live story session of `owner_id`.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the owner has no live session.
/// Returns `DomainError::Generation` if the store fails.
pub async fn get_session_view(
    owner_id: i64,
    store: &dyn SessionStore,
) -> Result<StorySessionView, DomainError> {
    get_story_session(owner_id, store).await.map(StorySessionView::from)
}

/// Where `owner_id` currently is. An unfinished onboarding dialog takes
/// precedence over an older story.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the owner has neither a dialog
/// nor a story. Returns `DomainError::Generation` if the store fails.
pub async fn get_dialog_state(
    owner_id: i64,
    store: &dyn SessionStore,
) -> Result<DialogState, DomainError> {
    if let Some(dialog) = get_json::<Dialog>(store, &StorageKey::dialog(owner_id)).await? {
        return Ok(dialog.state);
    }
    get_story_session(owner_id, store)
        .await
        .map(|session| session.dialog_state())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use lexi_core::store::set_json;
    use lexi_language::LanguageTable;
    use lexi_store::InMemorySessionStore;
    use lexi_test_support::FixedClock;

    use super::*;
    use crate::config::StoryConfig;
    use crate::domain::aggregates::{StoryLogic, StoryParams};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn session(owner_id: i64) -> StorySession {
        let params = StoryParams::new(
            "es",
            "en",
            "a fox",
            "a forest",
            &StoryConfig::default().story_model,
            &LanguageTable::builtin(),
        )
        .unwrap();
        let mut session = StorySession::new(
            owner_id,
            params,
            StoryLogic {
                character_growth_moments_left: 1,
            },
            fixed_now(),
        );
        session.record_turn(
            "El zorro caminaba despacio.",
            vec!["Correr".into(), "Dormir".into()],
            &["caminaba".into()],
            fixed_now(),
        );
        session
    }

    #[tokio::test]
    async fn test_get_session_view_returns_view_with_state() {
        // Arrange
        let store = InMemorySessionStore::new(Arc::new(FixedClock(fixed_now())));
        set_json(&store, &StorageKey::story_session(7), &session(7), None)
            .await
            .unwrap();

        // Act
        let view = get_session_view(7, &store).await.unwrap();

        // Assert
        assert_eq!(view.owner_id, 7);
        assert_eq!(view.state, DialogState::Active { turn: 1 });
        assert_eq!(view.turn_count, 1);
        assert_eq!(view.choices[1].choice_id, "2");
        assert_eq!(view.choices[1].text, "Dormir");
        assert_eq!(view.highlighted_text, "El zorro **caminaba** despacio.");
    }

    #[tokio::test]
    async fn test_get_session_view_returns_not_found_for_missing_owner() {
        let store = InMemorySessionStore::new(Arc::new(FixedClock(fixed_now())));

        let result = get_session_view(99, &store).await;

        assert!(matches!(result, Err(DomainError::SessionNotFound(99))));
    }

    #[tokio::test]
    async fn test_dialog_state_prefers_onboarding_dialog() {
        // Arrange
        let store = InMemorySessionStore::new(Arc::new(FixedClock(fixed_now())));
        set_json(&store, &StorageKey::story_session(7), &session(7), None)
            .await
            .unwrap();
        let dialog = Dialog {
            native_language: "en".into(),
            state: DialogState::SelectingLanguage,
        };
        set_json(&store, &StorageKey::dialog(7), &dialog, None)
            .await
            .unwrap();

        // Act
        let state = get_dialog_state(7, &store).await.unwrap();

        // Assert
        assert_eq!(state, DialogState::SelectingLanguage);
    }
}
