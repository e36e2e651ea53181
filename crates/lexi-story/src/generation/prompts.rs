//! Prompt templates for each generation stage.
//!
//! Every template is a pure function of its inputs. Story templates ask for
//! narrative text followed by a numbered list of exactly two choices, except
//! the conclusion and growth templates, which ask for prose only.

use lexi_language::LanguageTable;

use crate::domain::aggregates::StoryParams;

/// Word ceiling of the opening paragraph.
pub const OPENING_WORD_LIMIT: u32 = 75;
/// Word ceiling of a continuation turn.
pub const CONTINUATION_WORD_LIMIT: u32 = 150;
/// Word ceiling of the closing turn.
pub const CONCLUSION_WORD_LIMIT: u32 = 100;
/// Word ceiling of a character-growth moment.
pub const GROWTH_WORD_LIMIT: u32 = 60;

const AUDIENCE: &str = "suitable for a 10-year-old";

const CHOICES_INSTRUCTION: &str = "After the story text, on a new line, give exactly two \
choices for how the story could continue, as a numbered list:\n1. First choice\n2. Second choice";

/// Story facts shared by every story template, with language names already
/// rendered for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPromptContext {
    pub target_language: String,
    pub native_language: String,
    pub protagonist: String,
    pub setting: String,
}

impl StoryPromptContext {
    /// Renders `params` with English language names where `languages` knows
    /// them.
    #[must_use]
    pub fn from_params(params: &StoryParams, languages: &LanguageTable) -> Self {
        Self {
            target_language: language_label(languages, &params.target_language_code),
            native_language: language_label(languages, &params.native_language_code),
            protagonist: params.protagonist.clone(),
            setting: params.setting.clone(),
        }
    }

    fn preamble(&self) -> String {
        format!(
            "You are Lexi, a playful and encouraging storyteller for a child who is learning {target}.\n\
             The child's native language is {native}.\n\
             The story follows {protagonist} in {setting}.\n\
             Keep the tone warm, fun, and {AUDIENCE}.",
            target = self.target_language,
            native = self.native_language,
            protagonist = self.protagonist,
            setting = self.setting,
        )
    }
}

/// English name of `code`, or the code itself if the table does not know it.
#[must_use]
pub fn language_label(languages: &LanguageTable, code: &str) -> String {
    languages.english_name(code).unwrap_or(code).to_owned()
}

/// Which template a regular turn uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnTemplate {
    Continuation,
    Conclusion,
}

/// Picks the conclusion template once `turn` reaches `conclude_after_turn`.
#[must_use]
pub fn select_turn_template(turn: u32, conclude_after_turn: u32) -> TurnTemplate {
    if turn >= conclude_after_turn {
        TurnTemplate::Conclusion
    } else {
        TurnTemplate::Continuation
    }
}

/// Prompt for the first paragraph of a new story.
#[must_use]
pub fn opening_prompt(ctx: &StoryPromptContext) -> String {
    format!(
        "{preamble}\n\n\
         Write the opening paragraph of the story in {target}.\n\
         Keep the story text under {OPENING_WORD_LIMIT} words.\n\
         {CHOICES_INSTRUCTION}",
        preamble = ctx.preamble(),
        target = ctx.target_language,
    )
}

/// Prompt for a regular turn following the learner's choice.
#[must_use]
pub fn continuation_prompt(
    ctx: &StoryPromptContext,
    story_so_far: &str,
    user_choice: &str,
    turn: u32,
) -> String {
    format!(
        "{preamble}\n\n\
         Story so far:\n{story_so_far}\n\n\
         The child chose: {user_choice}\n\n\
         Continue the story from that choice with one or two paragraphs in {target}.\n\
         Keep the story text under {CONTINUATION_WORD_LIMIT} words.\n\
         {CHOICES_INSTRUCTION}\n\n\
         This is turn {turn}; the story is getting closer to its ending.",
        preamble = ctx.preamble(),
        target = ctx.target_language,
    )
}

/// Prompt for a short moment where the protagonist learns or grows.
///
/// The result is prepended to the turn that follows, so it asks for prose
/// only.
#[must_use]
pub fn character_growth_prompt(ctx: &StoryPromptContext, story_so_far: &str) -> String {
    format!(
        "{preamble}\n\n\
         Story so far:\n{story_so_far}\n\n\
         Write a short moment in {target} where {protagonist} learns something, \
         overcomes a small fear, or shows kindness.\n\
         Keep it under {GROWTH_WORD_LIMIT} words.\n\
         Do not offer any choices and do not use a numbered list.",
        preamble = ctx.preamble(),
        target = ctx.target_language,
        protagonist = ctx.protagonist,
    )
}

/// Prompt for the closing turn.
#[must_use]
pub fn conclusion_prompt(ctx: &StoryPromptContext, story_so_far: &str, user_choice: &str) -> String {
    format!(
        "{preamble}\n\n\
         Story so far:\n{story_so_far}\n\n\
         The child chose: {user_choice}\n\n\
         Bring the story to a happy, satisfying ending in one or two paragraphs in {target}.\n\
         Keep the ending under {CONCLUSION_WORD_LIMIT} words.\n\
         Do not offer any choices and do not use a numbered list.",
        preamble = ctx.preamble(),
        target = ctx.target_language,
    )
}

/// Prompt asking for a definition and translation of `word`.
///
/// The reply format (`Definition:` and `Translation:` lines) is what
/// [`parse_vocabulary_response`](crate::generation::parser::parse_vocabulary_response)
/// reads.
#[must_use]
pub fn vocabulary_prompt(
    word: &str,
    target_language: &str,
    native_language: &str,
    context: &str,
) -> String {
    format!(
        "You are a patient language teacher. Explain the word \"{word}\" as it is used here:\n\n\
         Context: {context}\n\n\
         Word language: {target_language}\n\
         Learner's native language: {native_language}\n\n\
         Answer in exactly this format:\n\
         Definition: <a simple definition in {target_language}>\n\
         Translation: <the translation into {native_language}>\n\n\
         Keep both {AUDIENCE}."
    )
}
