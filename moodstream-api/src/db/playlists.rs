//! Playlist persistence
//!
//! The playlist row and its ordered track rows are written in one
//! transaction; a partial playlist is never observable.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::services::catalog::Track;
use moodstream_common::db::models::{Playlist, PlaylistSource, PlaylistTrack};

/// Source tag stored on playlist track rows
pub const TRACK_SOURCE: &str = "AUDIUS";

/// Input for one playlist write; positions are assigned from the track
/// order given here.
pub struct NewPlaylist {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub source: PlaylistSource,
    pub mood_tags: Vec<String>,
    pub tracks: Vec<Track>,
}

/// Write the playlist and its tracks atomically and return the
/// persisted entity.
pub async fn create_playlist(
    pool: &SqlitePool,
    new: NewPlaylist,
) -> Result<Playlist, sqlx::Error> {
    let guid = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    let total_duration_sec: u32 = new.tracks.iter().map(|t| t.duration_sec).sum();
    let mood_tags_json = serde_json::to_string(&new.mood_tags).unwrap_or_else(|_| "[]".to_string());

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO playlists (guid, user_id, title, description, source, mood_tags, total_duration_sec, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(new.user_id.to_string())
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.source.as_str())
    .bind(&mood_tags_json)
    .bind(total_duration_sec as i64)
    .bind(&created_at)
    .execute(&mut *tx)
    .await?;

    for (position, track) in new.tracks.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO playlist_tracks (playlist_id, position, track_id, title, artist_name, duration_sec, source)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&guid)
        .bind(position as i64)
        .bind(&track.track_id)
        .bind(&track.title)
        .bind(&track.artist_name)
        .bind(track.duration_sec as i64)
        .bind(TRACK_SOURCE)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        playlist_id = %guid,
        tracks = new.tracks.len(),
        total_duration_sec = total_duration_sec,
        "Persisted playlist"
    );

    let tracks = new
        .tracks
        .into_iter()
        .enumerate()
        .map(|(position, track)| PlaylistTrack {
            track_id: track.track_id,
            title: track.title,
            artist_name: track.artist_name,
            duration_sec: track.duration_sec,
            position: position as u32,
            source: TRACK_SOURCE.to_string(),
        })
        .collect();

    Ok(Playlist {
        guid,
        user_id: new.user_id.to_string(),
        title: new.title,
        description: new.description,
        source: new.source,
        mood_tags: new.mood_tags,
        total_duration_sec,
        created_at,
        tracks,
    })
}
