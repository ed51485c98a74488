//! Track lookup and stream resolution

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use serde::Serialize;

use crate::db::track_cache;
use crate::error::{ApiError, ApiResult};
use crate::services::catalog::Track;
use crate::AppState;
use moodstream_common::db::models::CachedTrack;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDetail {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub duration_sec: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Local stream path; the stream endpoint resolves the upstream URL
    pub stream_url: String,
}

#[derive(Debug, Serialize)]
pub struct TrackDetailResponse {
    pub track: TrackDetail,
}

fn stream_path(track_id: &str) -> String {
    format!("/stream/{}", track_id)
}

impl From<CachedTrack> for TrackDetail {
    fn from(cached: CachedTrack) -> Self {
        let stream_url = stream_path(&cached.track_id);
        Self {
            track_id: cached.track_id,
            title: cached.title,
            artist_name: cached.artist_name,
            duration_sec: cached.duration_sec,
            genre: cached.genre,
            thumbnail_url: cached.thumbnail_url,
            stream_url,
        }
    }
}

impl From<Track> for TrackDetail {
    fn from(track: Track) -> Self {
        let stream_url = stream_path(&track.track_id);
        Self {
            track_id: track.track_id,
            title: track.title,
            artist_name: track.artist_name,
            duration_sec: track.duration_sec,
            genre: track.genre,
            thumbnail_url: track.thumbnail_url,
            stream_url,
        }
    }
}

/// GET /tracks/:id
///
/// Serves from the track cache while fresh; otherwise fetches from the
/// catalog and refreshes the cache.
pub async fn get_track(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> ApiResult<Json<TrackDetailResponse>> {
    if let Some(cached) = track_cache::fresh_track(&state.db, &track_id).await? {
        return Ok(Json(TrackDetailResponse {
            track: cached.into(),
        }));
    }

    let track = state
        .catalog
        .track_by_id(&track_id)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::NotFound("Track not found".to_string()))?;

    track_cache::cache_tracks(&state.db, std::slice::from_ref(&track)).await?;

    Ok(Json(TrackDetailResponse {
        track: track.into(),
    }))
}

/// GET /stream/:id
///
/// Resolves the upstream stream URL and redirects the client to it.
pub async fn stream_track(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> ApiResult<Redirect> {
    let url = state
        .catalog
        .stream_url(&track_id)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::NotFound("Track not found or unavailable".to_string()))?;

    tracing::debug!(track_id = %track_id, "Redirecting to upstream stream");

    Ok(Redirect::temporary(&url))
}
