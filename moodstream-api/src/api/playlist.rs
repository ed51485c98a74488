//! Playlist endpoints
//!
//! POST /ai/prompt-playlist runs the generation pipeline end to end.
//! POST /playlists/confirm persists a user-curated track list and
//! records per-track feedback.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::auth::AuthUser;
use crate::db::{feedback, playlists};
use crate::error::{ApiError, ApiResult};
use crate::generator::PlaylistGenerator;
use crate::services::catalog::Track;
use crate::AppState;
use moodstream_common::db::models::{Playlist, PlaylistSource};

const CONFIRM_DESCRIPTION: &str = "Personalized playlist based on your preferences";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrackResponse {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub duration_sec: u32,
    pub position: u32,
}

/// POST /ai/prompt-playlist response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPlaylistResponse {
    pub playlist_id: String,
    pub title: String,
    pub description: String,
    pub total_duration_sec: u32,
    pub tracks: Vec<PlaylistTrackResponse>,
}

impl From<Playlist> for PromptPlaylistResponse {
    fn from(playlist: Playlist) -> Self {
        Self {
            playlist_id: playlist.guid,
            title: playlist.title,
            description: playlist.description,
            total_duration_sec: playlist.total_duration_sec,
            tracks: playlist
                .tracks
                .into_iter()
                .map(|track| PlaylistTrackResponse {
                    track_id: track.track_id,
                    title: track.title,
                    artist_name: track.artist_name,
                    duration_sec: track.duration_sec,
                    position: track.position,
                })
                .collect(),
        }
    }
}

/// POST /ai/prompt-playlist
///
/// Body `{"prompt": "..."}`. Returns 201 with the persisted playlist,
/// 400 on a missing/empty prompt, 404 when nothing survives selection.
pub async fn generate_prompt_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<PromptPlaylistResponse>)> {
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Prompt is required".to_string()))?;

    let generator = PlaylistGenerator::new(
        state.db.clone(),
        state.catalog.clone(),
        state.completion.clone(),
    );

    let playlist = generator.generate(user.user_id, prompt).await?;

    Ok((StatusCode::CREATED, Json(playlist.into())))
}

/// One submitted track in a confirm request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTrack {
    pub track_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub duration_sec: u32,
    #[serde(default)]
    pub kept: bool,
}

/// POST /playlists/confirm response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPlaylistResponse {
    pub playlist_id: String,
    pub title: String,
    pub tracks: Vec<PlaylistTrackResponse>,
}

/// POST /playlists/confirm
///
/// Persists the kept tracks as an AUTO playlist and upserts feedback
/// (+1 kept, -1 dropped) for every submitted track.
pub async fn confirm_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<ConfirmPlaylistResponse>)> {
    let invalid = || ApiError::BadRequest("Title and tracks array are required".to_string());

    let title = body
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(invalid)?
        .to_string();

    let submitted: Vec<ConfirmTrack> = body
        .get("tracks")
        .cloned()
        .and_then(|tracks| serde_json::from_value(tracks).ok())
        .ok_or_else(invalid)?;

    let kept: Vec<Track> = submitted
        .iter()
        .filter(|track| track.kept)
        .map(|track| Track {
            track_id: track.track_id.clone(),
            title: track.title.clone(),
            artist_name: track.artist_name.clone(),
            duration_sec: track.duration_sec,
            thumbnail_url: None,
            genre: None,
            tags: vec![],
        })
        .collect();

    if kept.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one track must be kept".to_string(),
        ));
    }

    let playlist = playlists::create_playlist(
        &state.db,
        playlists::NewPlaylist {
            user_id: user.user_id,
            title,
            description: CONFIRM_DESCRIPTION.to_string(),
            source: PlaylistSource::Auto,
            mood_tags: vec![],
            tracks: kept,
        },
    )
    .await?;

    // Feedback covers every submitted track, kept or not
    for track in &submitted {
        let score = if track.kept { 1 } else { -1 };
        feedback::upsert_feedback(&state.db, user.user_id, &track.track_id, score).await?;
    }

    let response = ConfirmPlaylistResponse {
        playlist_id: playlist.guid,
        title: playlist.title,
        tracks: playlist
            .tracks
            .into_iter()
            .map(|track| PlaylistTrackResponse {
                track_id: track.track_id,
                title: track.title,
                artist_name: track.artist_name,
                duration_sec: track.duration_sec,
                position: track.position,
            })
            .collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
