//! Listening and search history

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use moodstream_common::db::models::{ListeningHistoryEntry, SearchHistoryEntry};

/// One playback event reported by the client
#[derive(Debug, Clone)]
pub struct NewListeningEvent {
    pub track_id: String,
    pub playlist_id: Option<String>,
    pub position_in_playlist: Option<u32>,
    pub played_ms: i64,
    pub skipped: bool,
    pub source: String,
}

pub async fn record_listening(
    pool: &SqlitePool,
    user_id: Uuid,
    event: &NewListeningEvent,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO listening_history (guid, user_id, track_id, playlist_id, position_in_playlist, played_ms, skipped, source)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(&event.track_id)
    .bind(&event.playlist_id)
    .bind(event.position_in_playlist.map(|p| p as i64))
    .bind(event.played_ms)
    .bind(event.skipped as i64)
    .bind(&event.source)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn record_search(
    pool: &SqlitePool,
    user_id: Uuid,
    query: &str,
    result_count: usize,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO search_history (guid, user_id, query, result_count)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(query)
    .bind(result_count as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Newest-first listening history for one user
pub async fn listening_history(
    pool: &SqlitePool,
    user_id: Uuid,
    limit: u32,
) -> Result<Vec<ListeningHistoryEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT guid, track_id, playlist_id, position_in_playlist, played_ms, skipped, source, played_at
        FROM listening_history
        WHERE user_id = ?
        ORDER BY played_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ListeningHistoryEntry {
            guid: row.get("guid"),
            track_id: row.get("track_id"),
            playlist_id: row.get("playlist_id"),
            position_in_playlist: row
                .get::<Option<i64>, _>("position_in_playlist")
                .map(|p| p as u32),
            played_ms: row.get("played_ms"),
            skipped: row.get::<i64, _>("skipped") != 0,
            source: row.get("source"),
            played_at: row.get("played_at"),
        })
        .collect())
}

/// Newest-first search history for one user
pub async fn search_history(
    pool: &SqlitePool,
    user_id: Uuid,
    limit: u32,
) -> Result<Vec<SearchHistoryEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT guid, query, result_count, searched_at
        FROM search_history
        WHERE user_id = ?
        ORDER BY searched_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SearchHistoryEntry {
            guid: row.get("guid"),
            query: row.get("query"),
            result_count: row.get("result_count"),
            searched_at: row.get("searched_at"),
        })
        .collect())
}
