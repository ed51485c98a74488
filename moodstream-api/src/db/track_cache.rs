//! Time-stamped track cache
//!
//! Snapshots of catalog tracks, refreshed whenever the catalog is
//! consulted. A cached row is served only while it is fresh.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::services::catalog::Track;
use moodstream_common::db::models::CachedTrack;

/// Cached rows older than this are treated as stale
pub const CACHE_TTL_SECONDS: i64 = 86_400;

fn cached_from_row(row: SqliteRow) -> CachedTrack {
    CachedTrack {
        track_id: row.get("track_id"),
        title: row.get("title"),
        artist_name: row.get("artist_name"),
        duration_sec: row.get::<i64, _>("duration_sec") as u32,
        thumbnail_url: row.get("thumbnail_url"),
        genre: row.get("genre"),
        cached_at: row.get("cached_at"),
    }
}

/// Fetch a cached track if it is still fresh
pub async fn fresh_track(
    pool: &SqlitePool,
    track_id: &str,
) -> Result<Option<CachedTrack>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT track_id, title, artist_name, duration_sec, thumbnail_url, genre, cached_at
        FROM track_cache
        WHERE track_id = ? AND cached_at > datetime('now', ?)
        "#,
    )
    .bind(track_id)
    .bind(format!("-{} seconds", CACHE_TTL_SECONDS))
    .fetch_optional(pool)
    .await?;

    Ok(row.map(cached_from_row))
}

/// Upsert catalog tracks into the cache, stamping them fresh
pub async fn cache_tracks(pool: &SqlitePool, tracks: &[Track]) -> Result<(), sqlx::Error> {
    for track in tracks {
        sqlx::query(
            r#"
            INSERT INTO track_cache (track_id, title, artist_name, duration_sec, thumbnail_url, genre, cached_at)
            VALUES (?, ?, ?, ?, ?, ?, datetime('now'))
            ON CONFLICT(track_id) DO UPDATE SET
                title = excluded.title,
                artist_name = excluded.artist_name,
                duration_sec = excluded.duration_sec,
                thumbnail_url = excluded.thumbnail_url,
                genre = excluded.genre,
                cached_at = excluded.cached_at
            "#,
        )
        .bind(&track.track_id)
        .bind(&track.title)
        .bind(&track.artist_name)
        .bind(track.duration_sec as i64)
        .bind(&track.thumbnail_url)
        .bind(&track.genre)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Fetch cached rows for a set of track ids, fresh or not.
///
/// Used to enrich history listings, where stale metadata beats none.
pub async fn tracks_by_ids(
    pool: &SqlitePool,
    track_ids: &[String],
) -> Result<HashMap<String, CachedTrack>, sqlx::Error> {
    if track_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; track_ids.len()].join(", ");
    let sql = format!(
        "SELECT track_id, title, artist_name, duration_sec, thumbnail_url, genre, cached_at \
         FROM track_cache WHERE track_id IN ({placeholders})"
    );

    let mut query = sqlx::query(&sql);
    for track_id in track_ids {
        query = query.bind(track_id);
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let track = cached_from_row(row);
            (track.track_id.clone(), track)
        })
        .collect())
}
