//! Lexi API — HTTP adapter around the story engine.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the full router. Layers such as tracing and CORS are added by the
/// binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stories", routes::stories::router())
        .with_state(state)
}
