//! Database models

use serde::{Deserialize, Serialize};

/// Playlist origin tag, stored as its wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistSource {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "MANUAL")]
    Manual,
    #[serde(rename = "AUTO")]
    Auto,
}

impl PlaylistSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistSource::Ai => "AI",
            PlaylistSource::Manual => "MANUAL",
            PlaylistSource::Auto => "AUTO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AI" => Some(PlaylistSource::Ai),
            "MANUAL" => Some(PlaylistSource::Manual),
            "AUTO" => Some(PlaylistSource::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "id")]
    pub guid: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub source: PlaylistSource,
    pub mood_tags: Vec<String>,
    pub total_duration_sec: u32,
    pub created_at: String,
    pub tracks: Vec<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrack {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub duration_sec: u32,
    pub position: u32,
    pub source: String,
}

/// Catalog track snapshot; fresh while cached_at is within the TTL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTrack {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub duration_sec: u32,
    pub thumbnail_url: Option<String>,
    pub genre: Option<String>,
    pub cached_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningHistoryEntry {
    #[serde(rename = "id")]
    pub guid: String,
    pub track_id: String,
    pub playlist_id: Option<String>,
    pub position_in_playlist: Option<u32>,
    pub played_ms: i64,
    pub skipped: bool,
    pub source: String,
    pub played_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    #[serde(rename = "id")]
    pub guid: String,
    pub query: String,
    pub result_count: i64,
    pub searched_at: String,
}
