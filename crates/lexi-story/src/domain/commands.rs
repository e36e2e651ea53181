//! Inputs accepted by the story engine.

use serde::Deserialize;

/// One user action, routed through `StoryEngine::handle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogInput {
    /// Begin onboarding. `ui_language` is the learner's native language and
    /// the language the interface speaks.
    Start { ui_language: String },
    /// Free-text or code selection of the story language.
    SelectLanguage { input: String },
    /// Free text answering the current onboarding question.
    Text { text: String },
    /// Pick one of the pending choices by its 1-based id.
    Choose { choice_id: String },
    /// Step back one onboarding question.
    Back,
    /// Finish the story and discard the session.
    End,
}

impl DialogInput {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::SelectLanguage { .. } => "select_language",
            Self::Text { .. } => "text",
            Self::Choose { .. } => "choose",
            Self::Back => "back",
            Self::End => "end",
        }
    }
}
