//! Lexi API server entry point.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lexi_api::config::AppConfig;
use lexi_api::error::AppError;
use lexi_api::state::AppState;
use lexi_core::clock::{Clock, SystemClock};
use lexi_core::moderation::{AllowAllGate, ContentGate};
use lexi_core::rng::{DeterministicRng, SystemRng};
use lexi_core::store::SessionStore;
use lexi_language::LanguageTable;
use lexi_openai::{OpenAiClient, OpenAiModerationGate};
use lexi_story::application::StoryEngine;
use lexi_store::InMemorySessionStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // A missing .env file is fine; the environment may be set directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Lexi API server");

    let config = AppConfig::from_env()?;

    let languages = match &config.languages_file {
        Some(path) => LanguageTable::from_path(path)?,
        None => LanguageTable::builtin(),
    };
    tracing::info!(languages = languages.supported().len(), "language table loaded");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemorySessionStore::new(Arc::clone(&clock)));
    let _sweeper = Arc::clone(&store).spawn_sweeper(SWEEP_INTERVAL);
    let store: Arc<dyn SessionStore> = store;

    let gate: Arc<dyn ContentGate> = if config.moderation_enabled {
        Arc::new(OpenAiModerationGate::new(&config.openai)?)
    } else {
        tracing::warn!("content moderation is disabled");
        Arc::new(AllowAllGate)
    };
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));

    let engine = StoryEngine::new(
        config.story.clone(),
        Arc::new(languages),
        Arc::clone(&store),
        Arc::new(OpenAiClient::new(&config.openai)?),
        gate,
        clock,
        rng,
    );
    let app_state = AppState::new(Arc::new(engine), store);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = lexi_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
