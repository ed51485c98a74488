//! moodstream-api library interface
//!
//! Exposes the router and application state for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod generator;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::catalog::CatalogSource;
use crate::services::completion::CompletionBackend;
use crate::services::recognition::FingerprintLookup;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Music catalog gateway
    pub catalog: Arc<dyn CatalogSource>,
    /// Chat-completion backend for the playlist generator
    pub completion: Arc<dyn CompletionBackend>,
    /// Audio-fingerprint lookup service
    pub recognizer: Arc<dyn FingerprintLookup>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        catalog: Arc<dyn CatalogSource>,
        completion: Arc<dyn CompletionBackend>,
        recognizer: Arc<dyn FingerprintLookup>,
    ) -> Self {
        Self {
            db,
            catalog,
            completion,
            recognizer,
        }
    }
}

/// Build application router
///
/// Protected routes require an authenticated identity (the fronting
/// auth layer sets `X-User-Id`); track lookup, streaming, suggestions
/// and the health endpoint are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/ai/prompt-playlist", post(api::generate_prompt_playlist))
        .route("/playlists/confirm", post(api::confirm_playlist))
        .route("/search/tracks", get(api::search_tracks))
        .route("/music/recognize", post(api::recognize_music))
        .route("/events/listening", post(api::record_listening_event))
        .route("/me/history/listening", get(api::listening_history))
        .route("/me/history/search", get(api::search_history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/tracks/:id", get(api::get_track))
        .route("/stream/:id", get(api::stream_track))
        .route("/home/suggestions", get(api::home_suggestions))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
