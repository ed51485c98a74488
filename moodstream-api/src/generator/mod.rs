//! AI playlist generation pipeline
//!
//! Strictly sequential: intent extraction, candidate assembly,
//! deduplication, shuffle, duration-bounded selection, metadata
//! generation, then one atomic persistence step. No stage branches
//! back to an earlier one.

pub mod assembler;
pub mod intent;
pub mod metadata;
pub mod selector;

pub use intent::{extract_intent, EnergyLevel, Intent};
pub use metadata::{generate_metadata, PlaylistMetadata};

use rand::seq::SliceRandom;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

use crate::db::playlists::{self, NewPlaylist};
use crate::services::catalog::{CatalogError, CatalogSource};
use crate::services::completion::{CompletionBackend, CompletionError};
use moodstream_common::db::models::{Playlist, PlaylistSource};
use uuid::Uuid;

/// Generation pipeline errors
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Completion service failure on a required path
    #[error("completion service error: {0}")]
    Completion(#[from] CompletionError),

    /// Intent reply unparseable even after the correction retry
    #[error("intent reply was not valid JSON after retry")]
    IntentParse,

    /// Catalog failure on a required path
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Nothing survived deduplication and selection
    #[error("no tracks matched the request")]
    NoCandidates,

    /// Persistence failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Runs the generation pipeline for one prompt
pub struct PlaylistGenerator {
    db: SqlitePool,
    catalog: Arc<dyn CatalogSource>,
    completion: Arc<dyn CompletionBackend>,
}

impl PlaylistGenerator {
    pub fn new(
        db: SqlitePool,
        catalog: Arc<dyn CatalogSource>,
        completion: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            db,
            catalog,
            completion,
        }
    }

    /// Generate and persist a playlist for the prompt.
    ///
    /// Returns the persisted playlist with its ordered tracks. An empty
    /// selection is reported as [`GenerateError::NoCandidates`] and
    /// nothing is written.
    pub async fn generate(&self, user_id: Uuid, prompt: &str) -> Result<Playlist, GenerateError> {
        let intent = extract_intent(self.completion.as_ref(), prompt).await?;
        tracing::info!(
            moods = ?intent.moods,
            genres = ?intent.genres,
            target_min = intent.target_duration_min,
            "Extracted playlist intent"
        );

        let candidates = assembler::assemble_candidates(self.catalog.as_ref(), &intent).await?;

        let mut pool = selector::dedupe_tracks(candidates);
        pool.shuffle(&mut rand::thread_rng());

        let (selected, achieved_sec) = selector::select_tracks(pool, intent.target_duration_sec());

        if selected.is_empty() {
            return Err(GenerateError::NoCandidates);
        }

        let metadata =
            generate_metadata(self.completion.as_ref(), prompt, &intent, selected.len()).await;

        let playlist = playlists::create_playlist(
            &self.db,
            NewPlaylist {
                user_id,
                title: metadata.title,
                description: metadata.description,
                source: PlaylistSource::Ai,
                mood_tags: intent.moods.clone(),
                tracks: selected,
            },
        )
        .await?;

        tracing::info!(
            playlist_id = %playlist.guid,
            tracks = playlist.tracks.len(),
            total_duration_sec = achieved_sec,
            "Generated playlist"
        );

        Ok(playlist)
    }
}
