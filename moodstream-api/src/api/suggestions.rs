//! Home page suggestions

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::catalog::Track;
use crate::AppState;

const SUGGESTION_LIMIT: u32 = 10;

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub tracks: Vec<Track>,
}

/// GET /home/suggestions
///
/// Trending catalog tracks. Degrades to an empty list on catalog
/// failure rather than erroring the home page.
pub async fn home_suggestions(State(state): State<AppState>) -> Json<SuggestionsResponse> {
    let tracks = match state.catalog.trending(None, SUGGESTION_LIMIT).await {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::warn!(error = %e, "Trending fetch failed, returning empty suggestions");
            Vec::new()
        }
    };

    Json(SuggestionsResponse { tracks })
}
