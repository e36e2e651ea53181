//! Cache-through vocabulary lookups.

use std::time::Duration;

use lexi_core::error::DomainError;
use lexi_core::key::StorageKey;
use lexi_core::llm::{CompletionRequest, LlmClient};
use lexi_core::store::{SessionStore, get_json, set_json};
use lexi_language::LanguageTable;
use tracing::{debug, info, instrument};

use crate::config::ModelSettings;
use crate::domain::outputs::VocabularyWord;
use crate::generation::parser::parse_vocabulary_response;
use crate::generation::prompts::{language_label, vocabulary_prompt};

/// A word to explain and where it was seen.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyRequest<'a> {
    pub word: &'a str,
    pub target_language: &'a str,
    pub native_language: &'a str,
    /// Text the word appeared in, handed to the model for disambiguation.
    pub context: &'a str,
}

/// Returns the explanation of `request.word`, asking the LLM only on a cache
/// miss. Words are trimmed and lowercased before lookup, so the cache is
/// case-insensitive.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank word, and
/// `DomainError::Generation` if the LLM fails, answers with nothing, or the
/// cache cannot be read or written.
#[instrument(skip_all, fields(word = request.word, target = request.target_language))]
pub async fn lookup_vocabulary(
    request: VocabularyRequest<'_>,
    settings: &ModelSettings,
    ttl: Duration,
    languages: &LanguageTable,
    store: &dyn SessionStore,
    llm: &dyn LlmClient,
) -> Result<VocabularyWord, DomainError> {
    let word = request.word.trim().to_lowercase();
    if word.is_empty() {
        return Err(DomainError::Validation("word must not be empty".to_owned()));
    }

    let key = StorageKey::vocabulary(&word, request.target_language, request.native_language);
    if let Some(cached) = get_json::<VocabularyWord>(store, &key).await? {
        debug!(%key, "vocabulary cache hit");
        return Ok(cached);
    }

    let prompt = vocabulary_prompt(
        &word,
        &language_label(languages, request.target_language),
        &language_label(languages, request.native_language),
        request.context,
    );
    let completion = llm
        .complete(&CompletionRequest {
            model: settings.model.clone(),
            prompt,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
        .await?;
    if completion.trim().is_empty() {
        return Err(DomainError::Generation(
            "vocabulary completion was empty".to_owned(),
        ));
    }

    let (definition, translation) = parse_vocabulary_response(&completion);
    let entry = VocabularyWord {
        word,
        definition,
        translation,
        language_code: request.target_language.to_owned(),
    };
    set_json(store, &key, &entry, Some(ttl)).await?;
    info!(%key, "vocabulary entry cached");

    Ok(entry)
}
