//! Values returned by the story engine.

use serde::{Deserialize, Serialize};

/// A pending choice with its stable 1-based id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryChoice {
    pub text: String,
    pub choice_id: String,
}

impl StoryChoice {
    /// Numbers `choices` from 1 in order.
    #[must_use]
    pub fn numbered(choices: &[String]) -> Vec<Self> {
        choices
            .iter()
            .enumerate()
            .map(|(index, choice)| Self {
                text: choice.clone(),
                choice_id: (index + 1).to_string(),
            })
            .collect()
    }
}

/// The product of one generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBit {
    /// Narrative text of this turn only.
    pub text: String,
    /// Choices offered next; empty when the story concluded.
    pub choices: Vec<StoryChoice>,
    /// Key words drawn from this turn's text.
    pub key_words: Vec<String>,
}

impl StoryBit {
    /// Builds a bit, numbering `choices` from 1.
    #[must_use]
    pub fn new(text: String, choices: &[String], key_words: Vec<String>) -> Self {
        Self {
            text,
            choices: StoryChoice::numbered(choices),
            key_words,
        }
    }

    /// Returns `true` if this bit ends the story.
    #[must_use]
    pub fn is_conclusion(&self) -> bool {
        self.choices.is_empty()
    }
}

/// A cached word explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub word: String,
    pub definition: String,
    pub translation: String,
    /// Language the word belongs to.
    pub language_code: String,
}

/// What the caller should show after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogOutput {
    /// Ask for the story language, optionally proposing the last one used.
    LanguagePrompt { suggested_language: Option<String> },
    /// Ask who the story is about.
    ProtagonistPrompt {
        target_language: String,
        language_name: String,
    },
    /// Ask where the story takes place.
    SettingPrompt { protagonist: String },
    /// A freshly generated turn.
    Story(StoryBit),
    /// The story was ended; carries the full text.
    Finished { story_text: String },
    /// Onboarding was abandoned.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_bit_numbers_choices_from_one() {
        let bit = StoryBit::new(
            "Text".into(),
            &["Explore".to_owned(), "Hide".to_owned()],
            Vec::new(),
        );

        assert_eq!(bit.choices[0].choice_id, "1");
        assert_eq!(bit.choices[1].choice_id, "2");
        assert_eq!(bit.choices[1].text, "Hide");
        assert!(!bit.is_conclusion());
    }

    #[test]
    fn test_story_output_serializes_with_type_tag() {
        let output = DialogOutput::Story(StoryBit::new("The end.".into(), &[], Vec::new()));

        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["type"], "story");
        assert_eq!(json["text"], "The end.");
    }
}
