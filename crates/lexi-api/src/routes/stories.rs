//! Routes for story sessions, keyed by owner.
//!
//! Every mutating route holds the owner's lock for the whole transition, so
//! the engine never sees two in-flight transitions for the same owner.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use lexi_story::application::query_handlers::{self, StorySessionView};
use lexi_story::domain::commands::DialogInput;
use lexi_story::domain::outputs::{DialogOutput, VocabularyWord};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{owner}/start.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    /// The learner's native language code.
    pub ui_language: String,
}

/// Request body for POST /{owner}/language.
#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    /// A language code or name, possibly misspelled.
    pub input: String,
}

/// Request body for POST /{owner}/text.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Request body for POST /{owner}/choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub choice_id: String,
}

async fn dispatch(
    state: &AppState,
    owner_id: i64,
    input: DialogInput,
) -> Result<Json<DialogOutput>, ApiError> {
    let _guard = state.locks.lock(owner_id).await;
    info!(input = input.kind(), "handling dialog input");
    let output = state.engine.handle(owner_id, input).await?;
    Ok(Json(output))
}

/// POST /{owner}/start
#[instrument(skip(state, request))]
async fn start(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
    Json(request): Json<StartRequest>,
) -> Result<Json<DialogOutput>, ApiError> {
    dispatch(
        &state,
        owner_id,
        DialogInput::Start {
            ui_language: request.ui_language,
        },
    )
    .await
}

/// POST /{owner}/language
#[instrument(skip(state, request))]
async fn select_language(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<DialogOutput>, ApiError> {
    dispatch(
        &state,
        owner_id,
        DialogInput::SelectLanguage {
            input: request.input,
        },
    )
    .await
}

/// POST /{owner}/text
#[instrument(skip(state, request))]
async fn text(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
    Json(request): Json<TextRequest>,
) -> Result<Json<DialogOutput>, ApiError> {
    dispatch(&state, owner_id, DialogInput::Text { text: request.text }).await
}

/// POST /{owner}/choice
#[instrument(skip(state, request), fields(choice_id = %request.choice_id))]
async fn choose(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<DialogOutput>, ApiError> {
    dispatch(
        &state,
        owner_id,
        DialogInput::Choose {
            choice_id: request.choice_id,
        },
    )
    .await
}

/// POST /{owner}/back
#[instrument(skip(state))]
async fn back(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> Result<Json<DialogOutput>, ApiError> {
    dispatch(&state, owner_id, DialogInput::Back).await
}

/// POST /{owner}/end
#[instrument(skip(state))]
async fn end(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> Result<Json<DialogOutput>, ApiError> {
    dispatch(&state, owner_id, DialogInput::End).await
}

/// GET /{owner}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> Result<Json<StorySessionView>, ApiError> {
    let view = query_handlers::get_session_view(owner_id, state.store.as_ref()).await?;
    Ok(Json(view))
}

/// GET /{owner}/vocabulary/{word}
#[instrument(skip(state))]
async fn vocabulary(
    State(state): State<AppState>,
    Path((owner_id, word)): Path<(i64, String)>,
) -> Result<Json<VocabularyWord>, ApiError> {
    let entry = state.engine.lookup_vocabulary(owner_id, &word).await?;
    Ok(Json(entry))
}

/// Returns the router for story sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{owner_id}", get(get_session))
        .route("/{owner_id}/start", post(start))
        .route("/{owner_id}/language", post(select_language))
        .route("/{owner_id}/text", post(text))
        .route("/{owner_id}/choice", post(choose))
        .route("/{owner_id}/back", post(back))
        .route("/{owner_id}/end", post(end))
        .route("/{owner_id}/vocabulary/{word}", get(vocabulary))
}
