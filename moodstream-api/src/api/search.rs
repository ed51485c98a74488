//! Track search endpoint

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::db::{history, track_cache};
use crate::error::{ApiError, ApiResult};
use crate::services::catalog::Track;
use crate::AppState;

/// Query parameters for GET /search/tracks
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,

    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_search_limit() -> u32 {
    20
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub tracks: Vec<Track>,
}

/// GET /search/tracks?q=...&limit=...
///
/// Searches the catalog, refreshes the track cache from the results and
/// records a search-history row.
pub async fn search_tracks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter is required".to_string()))?;

    let tracks = state
        .catalog
        .search(query, params.limit)
        .await
        .map_err(ApiError::upstream)?;

    track_cache::cache_tracks(&state.db, &tracks).await?;
    history::record_search(&state.db, user.user_id, query, tracks.len()).await?;

    Ok(Json(SearchResponse { tracks }))
}
