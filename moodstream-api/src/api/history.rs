//! Listening event recording and history listings

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::api::auth::AuthUser;
use crate::db::{history, track_cache};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use moodstream_common::db::models::SearchHistoryEntry;

const DEFAULT_LISTENING_LIMIT: u32 = 50;
const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// POST /events/listening
///
/// Records one playback event. `trackId`, `playedMs` and `source` are
/// required; playlist linkage and the skipped flag are optional.
pub async fn record_listening_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let invalid = || ApiError::BadRequest("trackId, playedMs, and source are required".to_string());

    let track_id = body
        .get("trackId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(invalid)?;

    let played_ms = body
        .get("playedMs")
        .and_then(Value::as_i64)
        .filter(|ms| *ms >= 0)
        .ok_or_else(invalid)?;

    let source = body
        .get("source")
        .and_then(Value::as_str)
        .filter(|source| !source.is_empty())
        .ok_or_else(invalid)?;

    let event = history::NewListeningEvent {
        track_id: track_id.to_string(),
        playlist_id: body
            .get("playlistId")
            .and_then(Value::as_str)
            .map(str::to_string),
        position_in_playlist: body
            .get("positionInPlaylist")
            .and_then(Value::as_u64)
            .map(|position| position as u32),
        played_ms,
        skipped: body
            .get("skipped")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        source: source.to_string(),
    };

    history::record_listening(&state.db, user.user_id, &event).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Listening event recorded" })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}

/// Listening history row enriched with cached track metadata
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedListeningEntry {
    pub id: String,
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub played_ms: i64,
    pub skipped: bool,
    pub source: String,
    pub played_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListeningHistoryResponse {
    pub history: Vec<EnrichedListeningEntry>,
}

/// GET /me/history/listening?limit=...
pub async fn listening_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<ListeningHistoryResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LISTENING_LIMIT);
    let entries = history::listening_history(&state.db, user.user_id, limit).await?;

    let track_ids: Vec<String> = entries
        .iter()
        .map(|entry| entry.track_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let cached = track_cache::tracks_by_ids(&state.db, &track_ids).await?;

    let history = entries
        .into_iter()
        .map(|entry| {
            let track = cached.get(&entry.track_id);
            EnrichedListeningEntry {
                id: entry.guid,
                title: track
                    .map(|t| t.title.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                artist_name: track
                    .map(|t| t.artist_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                thumbnail_url: track.and_then(|t| t.thumbnail_url.clone()),
                track_id: entry.track_id,
                played_ms: entry.played_ms,
                skipped: entry.skipped,
                source: entry.source,
                played_at: entry.played_at,
            }
        })
        .collect();

    Ok(Json(ListeningHistoryResponse { history }))
}

#[derive(Debug, Serialize)]
pub struct SearchHistoryResponse {
    pub history: Vec<SearchHistoryEntry>,
}

/// GET /me/history/search?limit=...
pub async fn search_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<SearchHistoryResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let history = history::search_history(&state.db, user.user_id, limit).await?;

    Ok(Json(SearchHistoryResponse { history }))
}
