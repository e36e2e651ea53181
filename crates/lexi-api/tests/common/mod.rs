//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lexi_core::clock::Clock;
use lexi_core::llm::LlmClient;
use lexi_core::moderation::ContentGate;
use lexi_core::rng::DeterministicRng;
use lexi_core::store::SessionStore;
use lexi_language::LanguageTable;
use lexi_story::application::StoryEngine;
use lexi_story::config::StoryConfig;
use lexi_store::InMemorySessionStore;
use lexi_test_support::{FixedClock, ScriptedLlmClient, SequenceRng, StubContentGate};
use tower::ServiceExt;

use lexi_api::build_router;
use lexi_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over an in-memory store, a scripted LLM, and
/// the given gate. Growth moments never fire.
pub fn build_test_app<I, S>(completions: I, gate: StubContentGate) -> Router
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let clock = fixed_clock();
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(Arc::clone(&clock)));
    let llm: Arc<dyn LlmClient> = Arc::new(ScriptedLlmClient::new(completions));
    let gate: Arc<dyn ContentGate> = Arc::new(gate);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SequenceRng::new(vec![1; 4], vec![0.99; 32])));
    let engine = StoryEngine::new(
        StoryConfig::default(),
        Arc::new(LanguageTable::builtin()),
        Arc::clone(&store),
        llm,
        gate,
        clock,
        rng,
    );

    build_router(AppState::new(Arc::new(engine), store))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
