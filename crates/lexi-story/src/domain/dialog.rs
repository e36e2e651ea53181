//! Onboarding dialog state.

use serde::{Deserialize, Serialize};

/// Where an owner is in the story lifecycle.
///
/// The three onboarding states are persisted in a [`Dialog`] record. Once a
/// story exists its state is derived from the `StorySession` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogState {
    SelectingLanguage,
    DefiningProtagonist {
        target_language: String,
    },
    DefiningSetting {
        target_language: String,
        protagonist: String,
    },
    Active {
        turn: u32,
    },
    Concluded,
}

impl DialogState {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectingLanguage => "selecting_language",
            Self::DefiningProtagonist { .. } => "defining_protagonist",
            Self::DefiningSetting { .. } => "defining_setting",
            Self::Active { .. } => "active",
            Self::Concluded => "concluded",
        }
    }
}

/// Persisted onboarding progress of one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// The learner's native language, fixed at `Start`.
    pub native_language: String,
    pub state: DialogState,
}

/// The story language an owner chose last time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePreference {
    pub language_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_state_is_tagged_in_json() {
        let state = DialogState::DefiningSetting {
            target_language: "es".into(),
            protagonist: "a fox".into(),
        };

        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["state"], "defining_setting");
        assert_eq!(json["protagonist"], "a fox");
        let back: DialogState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
