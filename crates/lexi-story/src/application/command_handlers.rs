//! Command handling for the story lifecycle.
//!
//! [`StoryEngine::handle`] is the single entry point: it loads the owner's
//! dialog or story, applies one [`DialogInput`], persists the result, and
//! returns what the caller should show next.

use std::sync::{Arc, Mutex, MutexGuard};

use lexi_core::clock::Clock;
use lexi_core::error::DomainError;
use lexi_core::key::StorageKey;
use lexi_core::llm::{CompletionRequest, LlmClient};
use lexi_core::moderation::ContentGate;
use lexi_core::rng::DeterministicRng;
use lexi_core::store::{SessionStore, get_json, set_json};
use lexi_language::{LanguageTable, resolve};
use tracing::{info, instrument, warn};

use crate::application::query_handlers;
use crate::application::vocabulary::{VocabularyRequest, lookup_vocabulary};
use crate::config::StoryConfig;
use crate::domain::aggregates::{StoryLogic, StoryParams, StorySession};
use crate::domain::commands::DialogInput;
use crate::domain::dialog::{Dialog, DialogState, LanguagePreference};
use crate::domain::outputs::{DialogOutput, StoryBit, VocabularyWord};
use crate::generation::parser::{extract_key_words, parse_story_response};
use crate::generation::prompts::{
    StoryPromptContext, TurnTemplate, character_growth_prompt, conclusion_prompt,
    continuation_prompt, opening_prompt, select_turn_template,
};

/// Drives onboarding and story turns for every owner.
///
/// The engine performs no locking of its own. Callers must ensure that at
/// most one call per owner is in flight at a time; concurrent calls for the
/// same owner race and the last store write wins.
pub struct StoryEngine {
    config: StoryConfig,
    languages: Arc<LanguageTable>,
    store: Arc<dyn SessionStore>,
    llm: Arc<dyn LlmClient>,
    gate: Arc<dyn ContentGate>,
    clock: Arc<dyn Clock>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl StoryEngine {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub fn new(
        config: StoryConfig,
        languages: Arc<LanguageTable>,
        store: Arc<dyn SessionStore>,
        llm: Arc<dyn LlmClient>,
        gate: Arc<dyn ContentGate>,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            config,
            languages,
            store,
            llm,
            gate,
            clock,
            rng,
        }
    }

    /// The language table the engine resolves against.
    #[must_use]
    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Applies `input` to the dialog or story of `owner_id`.
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation` for unsupported languages, blank text,
    ///   unknown choices, or input that does not fit the current state.
    /// - `DomainError::ContentRejected` if the content gate declines a
    ///   protagonist or setting. The dialog state is left unchanged.
    /// - `DomainError::Generation` if the LLM or the store fails, or the LLM
    ///   returns nothing usable. A failed transition leaves stored state as
    ///   it was.
    /// - `DomainError::SessionNotFound` if the owner has nothing to continue.
    #[instrument(skip(self, input), fields(input = input.kind()))]
    pub async fn handle(
        &self,
        owner_id: i64,
        input: DialogInput,
    ) -> Result<DialogOutput, DomainError> {
        match input {
            DialogInput::Start { ui_language } => self.start(owner_id, &ui_language).await,
            DialogInput::SelectLanguage { input } => {
                let dialog = self.load_dialog(owner_id).await?;
                self.select_language(owner_id, dialog, &input).await
            }
            DialogInput::Text { text } => self.text(owner_id, &text).await,
            DialogInput::Choose { choice_id } => self.choose(owner_id, &choice_id).await,
            DialogInput::Back => self.back(owner_id).await,
            DialogInput::End => self.end(owner_id).await,
        }
    }

    /// Current state of `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the owner has neither a
    /// dialog nor a story, or `DomainError::Generation` if the store fails.
    pub async fn state(&self, owner_id: i64) -> Result<DialogState, DomainError> {
        query_handlers::get_dialog_state(owner_id, self.store.as_ref()).await
    }

    /// Builds a fresh session at turn 0, drawing its growth-moment budget.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Generation` if the RNG lock is poisoned.
    pub fn new_session(
        &self,
        owner_id: i64,
        params: StoryParams,
    ) -> Result<StorySession, DomainError> {
        // Lock RNG only for the draw, never across an await.
        let moments = {
            let mut rng = self.lock_rng()?;
            rng.next_u32_range(self.config.growth_moments_min, self.config.growth_moments_max)
        };
        Ok(StorySession::new(
            owner_id,
            params,
            StoryLogic {
                character_growth_moments_left: moments,
            },
            self.clock.now(),
        ))
    }

    /// Generates and stores the opening turn of `session`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Generation` if the LLM fails, answers with
    /// nothing, or the write fails. Nothing is stored on error.
    #[instrument(skip_all, fields(owner_id = session.owner_id))]
    pub async fn generate_initial_story(
        &self,
        mut session: StorySession,
    ) -> Result<(StorySession, StoryBit), DomainError> {
        let bit = self.open_story(&mut session).await?;
        self.save_session(&session).await?;
        info!(turn = session.turn_count, "story opened");

        Ok((session, bit))
    }

    /// Generates the next turn after the learner picked `choice_text`.
    ///
    /// May first insert a character-growth moment, then uses the conclusion
    /// template once the turn counter reaches the configured limit. Works on
    /// a copy: `session` is untouched and the store is written exactly once,
    /// after every LLM call succeeded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Generation` if an LLM call fails, the turn comes
    /// back without story text, the RNG lock is poisoned, or the write fails.
    #[instrument(skip_all, fields(owner_id = session.owner_id, turn = session.turn_count))]
    pub async fn continue_story(
        &self,
        session: &StorySession,
        choice_text: &str,
    ) -> Result<(StorySession, StoryBit), DomainError> {
        let mut next = session.clone();
        let ctx = StoryPromptContext::from_params(&next.params, &self.languages);
        let mut content = String::new();

        if next.logic.character_growth_moments_left > 0 && self.draw_growth()? {
            let growth = self
                .complete(&next.params, character_growth_prompt(&ctx, &next.story_text))
                .await?;
            content.push_str(growth.trim());
            content.push_str("\n\n");
            next.logic.character_growth_moments_left -= 1;
            info!(
                moments_left = next.logic.character_growth_moments_left,
                "character growth moment"
            );
        }

        let prompt = match select_turn_template(next.turn_count, self.config.conclude_after_turn) {
            TurnTemplate::Conclusion => conclusion_prompt(&ctx, &next.story_text, choice_text),
            TurnTemplate::Continuation => {
                continuation_prompt(&ctx, &next.story_text, choice_text, next.turn_count)
            }
        };
        content.push_str(&self.complete(&next.params, prompt).await?);

        let bit = self.apply_completion(&mut next, &content)?;
        self.save_session(&next).await?;
        info!(
            turn = next.turn_count,
            concluded = next.is_concluded(),
            "story advanced"
        );

        Ok((next, bit))
    }

    /// Loads the live story of `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if there is none, or
    /// `DomainError::Generation` if the store fails.
    pub async fn get_story_session(&self, owner_id: i64) -> Result<StorySession, DomainError> {
        query_handlers::get_story_session(owner_id, self.store.as_ref()).await
    }

    /// Removes the story of `owner_id`. Removing a missing story is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Generation` if the store fails.
    pub async fn delete_story_session(&self, owner_id: i64) -> Result<(), DomainError> {
        self.store
            .delete(&StorageKey::story_session(owner_id))
            .await?;
        Ok(())
    }

    /// Explains `word` in the context of the owner's story.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` without a live story, plus the
    /// errors of [`lookup_vocabulary`].
    #[instrument(skip(self))]
    pub async fn lookup_vocabulary(
        &self,
        owner_id: i64,
        word: &str,
    ) -> Result<VocabularyWord, DomainError> {
        let session = self.get_story_session(owner_id).await?;
        lookup_vocabulary(
            VocabularyRequest {
                word,
                target_language: &session.params.target_language_code,
                native_language: &session.params.native_language_code,
                context: &session.story_text,
            },
            &self.config.vocabulary_model,
            self.config.vocabulary_ttl,
            &self.languages,
            self.store.as_ref(),
            self.llm.as_ref(),
        )
        .await
    }

    async fn start(&self, owner_id: i64, ui_language: &str) -> Result<DialogOutput, DomainError> {
        let native_language = ui_language.trim();
        if !self.languages.is_supported(native_language) {
            return Err(DomainError::Validation(format!(
                "unsupported interface language `{native_language}`"
            )));
        }

        self.save_dialog(
            owner_id,
            &Dialog {
                native_language: native_language.to_owned(),
                state: DialogState::SelectingLanguage,
            },
        )
        .await?;

        let suggested_language =
            get_json::<LanguagePreference>(self.store.as_ref(), &StorageKey::preference(owner_id))
                .await?
                .map(|preference| preference.language_code)
                .filter(|code| self.languages.is_supported(code));
        info!(native_language, "onboarding started");

        Ok(DialogOutput::LanguagePrompt { suggested_language })
    }

    async fn select_language(
        &self,
        owner_id: i64,
        dialog: Dialog,
        input: &str,
    ) -> Result<DialogOutput, DomainError> {
        if dialog.state != DialogState::SelectingLanguage {
            return Err(wrong_state("select a language", &dialog.state));
        }

        let matched = resolve(input, &self.languages, &dialog.native_language);
        let Some(target_language) = matched.code else {
            return Err(DomainError::Validation(format!(
                "could not recognize a supported language in `{}`",
                input.trim()
            )));
        };

        let language_name = self
            .languages
            .display_name(&target_language, &dialog.native_language)
            .to_owned();
        self.save_dialog(
            owner_id,
            &Dialog {
                native_language: dialog.native_language,
                state: DialogState::DefiningProtagonist {
                    target_language: target_language.clone(),
                },
            },
        )
        .await?;
        info!(
            target_language,
            confidence = matched.confidence,
            "story language selected"
        );

        Ok(DialogOutput::ProtagonistPrompt {
            target_language,
            language_name,
        })
    }

    async fn text(&self, owner_id: i64, text: &str) -> Result<DialogOutput, DomainError> {
        let dialog = self.load_dialog(owner_id).await?;
        match dialog.state.clone() {
            DialogState::SelectingLanguage => self.select_language(owner_id, dialog, text).await,
            DialogState::DefiningProtagonist { target_language } => {
                let protagonist = self.approved_text(text, "protagonist").await?;
                self.save_dialog(
                    owner_id,
                    &Dialog {
                        native_language: dialog.native_language,
                        state: DialogState::DefiningSetting {
                            target_language,
                            protagonist: protagonist.clone(),
                        },
                    },
                )
                .await?;
                info!("protagonist accepted");
                Ok(DialogOutput::SettingPrompt { protagonist })
            }
            DialogState::DefiningSetting {
                target_language,
                protagonist,
            } => {
                let setting = self.approved_text(text, "setting").await?;
                let params = StoryParams::new(
                    &target_language,
                    &dialog.native_language,
                    &protagonist,
                    &setting,
                    &self.config.story_model,
                    &self.languages,
                )?;
                let mut session = self.new_session(owner_id, params)?;
                let bit = self.open_story(&mut session).await?;

                if let Err(err) = self.commit_opening(&session, &target_language).await {
                    self.restore_dialog(owner_id, &dialog).await;
                    return Err(err);
                }
                info!(turn = session.turn_count, "story opened");

                Ok(DialogOutput::Story(bit))
            }
            state @ (DialogState::Active { .. } | DialogState::Concluded) => {
                Err(wrong_state("answer an onboarding question", &state))
            }
        }
    }

    async fn choose(&self, owner_id: i64, choice_id: &str) -> Result<DialogOutput, DomainError> {
        if let Some(dialog) = self.find_dialog(owner_id).await? {
            return Err(wrong_state("pick a story choice", &dialog.state));
        }
        let session = self.get_story_session(owner_id).await?;
        let choice_text = session.choice(choice_id)?.to_owned();

        let (_, bit) = self.continue_story(&session, &choice_text).await?;
        Ok(DialogOutput::Story(bit))
    }

    async fn back(&self, owner_id: i64) -> Result<DialogOutput, DomainError> {
        let Some(dialog) = self.find_dialog(owner_id).await? else {
            let session = self.get_story_session(owner_id).await?;
            return Err(wrong_state("go back", &session.dialog_state()));
        };

        let (state, output) = match dialog.state {
            DialogState::DefiningSetting {
                target_language, ..
            } => {
                let language_name = self
                    .languages
                    .display_name(&target_language, &dialog.native_language)
                    .to_owned();
                (
                    DialogState::DefiningProtagonist {
                        target_language: target_language.clone(),
                    },
                    DialogOutput::ProtagonistPrompt {
                        target_language,
                        language_name,
                    },
                )
            }
            DialogState::DefiningProtagonist { .. } => (
                DialogState::SelectingLanguage,
                DialogOutput::LanguagePrompt {
                    suggested_language: None,
                },
            ),
            DialogState::SelectingLanguage
            | DialogState::Active { .. }
            | DialogState::Concluded => {
                self.store.delete(&StorageKey::dialog(owner_id)).await?;
                info!("onboarding cancelled");
                return Ok(DialogOutput::Cancelled);
            }
        };

        info!(state = state.name(), "stepped back");
        self.save_dialog(
            owner_id,
            &Dialog {
                native_language: dialog.native_language,
                state,
            },
        )
        .await?;
        Ok(output)
    }

    async fn end(&self, owner_id: i64) -> Result<DialogOutput, DomainError> {
        let dialog = self.find_dialog(owner_id).await?;
        let session =
            get_json::<StorySession>(self.store.as_ref(), &StorageKey::story_session(owner_id))
                .await?;

        match (session, dialog) {
            (Some(session), _) => {
                self.delete_story_session(owner_id).await?;
                self.store.delete(&StorageKey::dialog(owner_id)).await?;
                info!(turns = session.turn_count, "story ended");
                Ok(DialogOutput::Finished {
                    story_text: session.story_text,
                })
            }
            (None, Some(_)) => {
                self.store.delete(&StorageKey::dialog(owner_id)).await?;
                info!("onboarding cancelled");
                Ok(DialogOutput::Cancelled)
            }
            (None, None) => Err(DomainError::SessionNotFound(owner_id)),
        }
    }

    /// Generates the opening turn into `session` without storing it.
    async fn open_story(&self, session: &mut StorySession) -> Result<StoryBit, DomainError> {
        let ctx = StoryPromptContext::from_params(&session.params, &self.languages);
        let completion = self.complete(&session.params, opening_prompt(&ctx)).await?;
        self.apply_completion(session, &completion)
    }

    /// Ends onboarding. The session write comes last: until it succeeds the
    /// owner has no story.
    async fn commit_opening(
        &self,
        session: &StorySession,
        target_language: &str,
    ) -> Result<(), DomainError> {
        let owner_id = session.owner_id;
        self.store.delete(&StorageKey::dialog(owner_id)).await?;
        set_json(
            self.store.as_ref(),
            &StorageKey::preference(owner_id),
            &LanguagePreference {
                language_code: target_language.to_owned(),
            },
            None,
        )
        .await?;
        self.save_session(session).await
    }

    async fn restore_dialog(&self, owner_id: i64, dialog: &Dialog) {
        if let Err(e) = self.save_dialog(owner_id, dialog).await {
            warn!(error = %e, "could not restore onboarding dialog");
        }
    }

    async fn approved_text(&self, text: &str, field: &str) -> Result<String, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation(format!("{field} must not be empty")));
        }
        if !self.gate.is_appropriate(text).await {
            warn!(field, "content gate rejected input");
            return Err(DomainError::ContentRejected(format!(
                "the {field} is not suitable for the story"
            )));
        }
        Ok(text.to_owned())
    }

    async fn complete(&self, params: &StoryParams, prompt: String) -> Result<String, DomainError> {
        let completion = self
            .llm
            .complete(&CompletionRequest {
                model: params.model.clone(),
                prompt,
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            })
            .await?;
        if completion.trim().is_empty() {
            return Err(DomainError::Generation("completion was empty".to_owned()));
        }
        Ok(completion)
    }

    fn apply_completion(
        &self,
        session: &mut StorySession,
        completion: &str,
    ) -> Result<StoryBit, DomainError> {
        let parsed = parse_story_response(completion);
        if !parsed.has_text() {
            return Err(DomainError::Generation(
                "completion contained no story text".to_owned(),
            ));
        }
        let key_words = extract_key_words(&parsed.story_text);
        session.record_turn(
            &parsed.story_text,
            parsed.choices.clone(),
            &key_words,
            self.clock.now(),
        );
        Ok(StoryBit::new(parsed.story_text, &parsed.choices, key_words))
    }

    fn draw_growth(&self) -> Result<bool, DomainError> {
        let mut rng = self.lock_rng()?;
        Ok(rng.next_f64() < self.config.growth_probability)
    }

    fn lock_rng(
        &self,
    ) -> Result<MutexGuard<'_, dyn DeterministicRng + Send + 'static>, DomainError> {
        self.rng
            .lock()
            .map_err(|e| DomainError::Generation(format!("RNG mutex poisoned: {e}")))
    }

    async fn save_session(&self, session: &StorySession) -> Result<(), DomainError> {
        set_json(
            self.store.as_ref(),
            &StorageKey::story_session(session.owner_id),
            session,
            self.config.session_ttl,
        )
        .await?;
        Ok(())
    }

    async fn find_dialog(&self, owner_id: i64) -> Result<Option<Dialog>, DomainError> {
        Ok(get_json(self.store.as_ref(), &StorageKey::dialog(owner_id)).await?)
    }

    async fn load_dialog(&self, owner_id: i64) -> Result<Dialog, DomainError> {
        if let Some(dialog) = self.find_dialog(owner_id).await? {
            return Ok(dialog);
        }
        let session = self.get_story_session(owner_id).await?;
        Err(wrong_state(
            "answer an onboarding question",
            &session.dialog_state(),
        ))
    }

    async fn save_dialog(&self, owner_id: i64, dialog: &Dialog) -> Result<(), DomainError> {
        set_json(
            self.store.as_ref(),
            &StorageKey::dialog(owner_id),
            dialog,
            self.config.dialog_ttl,
        )
        .await?;
        Ok(())
    }
}

fn wrong_state(action: &str, state: &DialogState) -> DomainError {
    DomainError::Validation(format!("cannot {action} while {}", state.name()))
}
