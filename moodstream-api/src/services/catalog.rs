//! Music catalog gateway (Audius discovery API)
//!
//! Normalizes catalog responses into the track shape used across the
//! service and exposes search, lookup-by-id, trending and stream-URL
//! resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use moodstream_common::config::CatalogConfig;

const USER_AGENT: &str = "moodstream/0.1.0 (https://github.com/moodstream/moodstream)";

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Normalized catalog track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub duration_sec: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Catalog operations used by handlers and the playlist generator
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Free-text track search
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError>;

    /// Point lookup by catalog id
    async fn track_by_id(&self, track_id: &str) -> Result<Option<Track>, CatalogError>;

    /// Trending tracks, optionally constrained to one genre
    async fn trending(&self, genre: Option<&str>, limit: u32) -> Result<Vec<Track>, CatalogError>;

    /// Resolve the upstream stream URL for a track
    async fn stream_url(&self, track_id: &str) -> Result<Option<String>, CatalogError>;
}

/// Audius track as returned by the discovery API
#[derive(Debug, Deserialize)]
struct AudiusTrack {
    id: String,
    title: String,
    user: Option<AudiusUser>,
    duration: Option<u32>,
    genre: Option<String>,
    tags: Option<String>,
    artwork: Option<AudiusArtwork>,
}

#[derive(Debug, Deserialize)]
struct AudiusUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AudiusArtwork {
    #[serde(rename = "150x150")]
    small: Option<String>,
    #[serde(rename = "480x480")]
    medium: Option<String>,
}

/// Responses arrive wrapped in a `data` envelope
#[derive(Debug, Deserialize)]
struct AudiusEnvelope<T> {
    data: Option<T>,
}

fn normalize_track(track: AudiusTrack) -> Track {
    Track {
        track_id: track.id,
        title: track.title,
        artist_name: track
            .user
            .and_then(|u| u.name)
            .unwrap_or_else(|| "Unknown Artist".to_string()),
        duration_sec: track.duration.unwrap_or(0),
        thumbnail_url: track.artwork.and_then(|a| a.medium.or(a.small)),
        genre: track.genre,
        tags: track
            .tags
            .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
    }
}

/// Audius catalog client
pub struct AudiusClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AudiusClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_track_list(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Track>, CatalogError> {
        let response = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let envelope: AudiusEnvelope<Vec<AudiusTrack>> = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(normalize_track)
            .collect())
    }
}

#[async_trait]
impl CatalogSource for AudiusClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/v1/tracks/search", self.base_url);

        tracing::debug!(query = %query, limit = limit, "Searching catalog");

        let tracks = self
            .fetch_track_list(
                &url,
                &[("query", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        tracing::debug!(query = %query, results = tracks.len(), "Catalog search complete");

        Ok(tracks)
    }

    async fn track_by_id(&self, track_id: &str) -> Result<Option<Track>, CatalogError> {
        let url = format!("{}/v1/tracks/{}", self.base_url, track_id);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let envelope: AudiusEnvelope<AudiusTrack> = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(envelope.data.map(normalize_track))
    }

    async fn trending(&self, genre: Option<&str>, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/v1/tracks/trending", self.base_url);

        let mut params = vec![("limit", limit.to_string())];
        if let Some(genre) = genre {
            params.push(("genre", genre.to_string()));
        }

        self.fetch_track_list(&url, &params).await
    }

    async fn stream_url(&self, track_id: &str) -> Result<Option<String>, CatalogError> {
        // A stream URL is only meaningful for a track the catalog knows about
        Ok(self
            .track_by_id(track_id)
            .await?
            .map(|_| format!("{}/v1/tracks/{}/stream", self.base_url, track_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AudiusClient::new(&CatalogConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn normalize_prefers_medium_artwork() {
        let track = AudiusTrack {
            id: "abc".to_string(),
            title: "Song".to_string(),
            user: Some(AudiusUser {
                name: Some("Artist".to_string()),
            }),
            duration: Some(240),
            genre: Some("Electronic".to_string()),
            tags: Some("chill, night drive".to_string()),
            artwork: Some(AudiusArtwork {
                small: Some("https://img/150.jpg".to_string()),
                medium: Some("https://img/480.jpg".to_string()),
            }),
        };

        let normalized = normalize_track(track);
        assert_eq!(normalized.track_id, "abc");
        assert_eq!(normalized.artist_name, "Artist");
        assert_eq!(normalized.duration_sec, 240);
        assert_eq!(normalized.thumbnail_url.as_deref(), Some("https://img/480.jpg"));
        assert_eq!(normalized.tags, vec!["chill", "night drive"]);
    }

    #[test]
    fn normalize_defaults_missing_fields() {
        let track = AudiusTrack {
            id: "xyz".to_string(),
            title: "Untitled".to_string(),
            user: None,
            duration: None,
            genre: None,
            tags: None,
            artwork: Some(AudiusArtwork {
                small: Some("https://img/150.jpg".to_string()),
                medium: None,
            }),
        };

        let normalized = normalize_track(track);
        assert_eq!(normalized.artist_name, "Unknown Artist");
        assert_eq!(normalized.duration_sec, 0);
        assert_eq!(normalized.thumbnail_url.as_deref(), Some("https://img/150.jpg"));
        assert!(normalized.tags.is_empty());
    }

    #[test]
    fn track_serializes_camel_case() {
        let track = Track {
            track_id: "abc".to_string(),
            title: "Song".to_string(),
            artist_name: "Artist".to_string(),
            duration_sec: 180,
            thumbnail_url: None,
            genre: None,
            tags: vec![],
        };

        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value["trackId"], "abc");
        assert_eq!(value["artistName"], "Artist");
        assert_eq!(value["durationSec"], 180);
        assert!(value.get("thumbnailUrl").is_none());
    }
}
