//! Database initialization
//!
//! Creates the database file on first run and brings the schema up
//! idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Set busy timeout so concurrent request handlers wait instead of erroring
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_users_table(&pool).await?;
    create_playlists_table(&pool).await?;
    create_playlist_tracks_table(&pool).await?;
    create_listening_history_table(&pool).await?;
    create_search_history_table(&pool).await?;
    create_feedback_table(&pool).await?;
    create_track_cache_table(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    // Session issuance lives in the fronting auth layer; rows are
    // upserted on first sight of an authenticated user id.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            display_name TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the playlists table
///
/// Stores playlist metadata; ordered tracks live in playlist_tracks.
pub async fn create_playlists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL CHECK (source IN ('AI', 'MANUAL', 'AUTO')),
            mood_tags TEXT NOT NULL DEFAULT '[]',
            total_duration_sec INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (total_duration_sec >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_playlists_user ON playlists(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the playlist_tracks table
///
/// Ordered child rows of playlists; position is the 0-based output order.
pub async fn create_playlist_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_tracks (
            playlist_id TEXT NOT NULL REFERENCES playlists(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            track_id TEXT NOT NULL,
            title TEXT NOT NULL,
            artist_name TEXT NOT NULL,
            duration_sec INTEGER NOT NULL DEFAULT 0,
            source TEXT NOT NULL DEFAULT 'AUDIUS',
            PRIMARY KEY (playlist_id, position),
            CHECK (position >= 0),
            CHECK (duration_sec >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_playlist_tracks_playlist ON playlist_tracks(playlist_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_listening_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listening_history (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            track_id TEXT NOT NULL,
            playlist_id TEXT,
            position_in_playlist INTEGER,
            played_ms INTEGER NOT NULL,
            skipped INTEGER NOT NULL DEFAULT 0,
            source TEXT NOT NULL,
            played_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (played_ms >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_listening_history_user ON listening_history(user_id, played_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_search_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_history (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            query TEXT NOT NULL,
            result_count INTEGER NOT NULL DEFAULT 0,
            searched_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_search_history_user ON search_history(user_id, searched_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the feedback table
///
/// One row per (user, track); writes are upserts, last write wins.
pub async fn create_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            user_id TEXT NOT NULL,
            track_id TEXT NOT NULL,
            score INTEGER NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (user_id, track_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_track_cache_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_cache (
            track_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            artist_name TEXT NOT NULL,
            duration_sec INTEGER NOT NULL DEFAULT 0,
            thumbnail_url TEXT,
            genre TEXT,
            cached_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Index for freshness queries
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_track_cache_cached_at ON track_cache(cached_at)")
        .execute(pool)
        .await?;

    Ok(())
}
