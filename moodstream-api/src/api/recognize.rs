//! Music recognition endpoint
//!
//! The client computes the chromaprint fingerprint; this endpoint only
//! proxies the lookup and matches the recognized recording back to a
//! playable catalog track.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::services::catalog::Track;
use crate::AppState;

/// Catalog search width when matching a recognized recording
const MATCH_SEARCH_LIMIT: u32 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResponse {
    pub recognized_title: String,
    pub recognized_artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognized_album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub matched_track: Option<Track>,
}

/// POST /music/recognize
///
/// Body `{"fingerprint": "...", "duration": seconds}`. 404 when the
/// fingerprint matches nothing; the catalog match is nullable.
pub async fn recognize_music(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<RecognizeResponse>> {
    let invalid = || ApiError::BadRequest("Fingerprint and duration are required".to_string());

    let fingerprint = body
        .get("fingerprint")
        .and_then(Value::as_str)
        .filter(|fingerprint| !fingerprint.is_empty())
        .ok_or_else(invalid)?;

    let duration_sec = body
        .get("duration")
        .and_then(Value::as_u64)
        .filter(|duration| *duration > 0)
        .ok_or_else(invalid)?;

    let recognition = state
        .recognizer
        .recognize(fingerprint, duration_sec)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::NotFound("Could not recognize the song".to_string()))?;

    // Match the recognized recording back to a playable catalog track
    let query = format!("{} {}", recognition.title, recognition.artist);
    let matched_track = state
        .catalog
        .search(&query, MATCH_SEARCH_LIMIT)
        .await
        .map_err(ApiError::upstream)?
        .into_iter()
        .next();

    Ok(Json(RecognizeResponse {
        recognized_title: recognition.title,
        recognized_artist: recognition.artist,
        recognized_album: recognition.album,
        confidence: recognition.confidence,
        matched_track,
    }))
}
