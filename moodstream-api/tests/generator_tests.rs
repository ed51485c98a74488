//! Pipeline-level tests for the playlist generator
//!
//! Drives the generator against in-process fakes: intent extraction
//! with the single correction retry, assembly failure policy, the
//! duration selector, metadata fallback, and atomic persistence.

mod helpers;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use helpers::{intent_reply, setup_pool, track, FakeCatalog, ScriptedCompletion};
use moodstream_api::generator::metadata::{DEFAULT_DESCRIPTION, DEFAULT_TITLE};
use moodstream_api::generator::{
    extract_intent, generate_metadata, EnergyLevel, GenerateError, Intent, PlaylistGenerator,
};
use moodstream_api::services::catalog::{CatalogError, CatalogSource, Track};
use moodstream_api::services::completion::CompletionError;

// =============================================================================
// Intent extraction
// =============================================================================

#[tokio::test]
async fn intent_defaults_for_empty_reply() {
    let completion = ScriptedCompletion::new(vec![Ok("{}".to_string())]);

    let intent = extract_intent(&completion, "something vague").await.unwrap();

    assert!(intent.moods.is_empty());
    assert!(intent.genres.is_empty());
    assert_eq!(intent.target_duration_min, 30);
    assert!(intent.language_preferences.is_empty());
    assert_eq!(intent.energy_curve, vec![EnergyLevel::Medium]);
    assert!(intent.other_constraints.is_empty());

    // A parseable first reply means no retry
    assert_eq!(completion.request_count().await, 1);
}

#[tokio::test]
async fn intent_retries_once_with_correction() {
    let completion = ScriptedCompletion::new(vec![
        Ok("sure! here is some JSON".to_string()),
        Ok(r#"{"moods":["chill"],"targetDurationMin":45}"#.to_string()),
    ]);

    let intent = extract_intent(&completion, "chill please").await.unwrap();
    assert_eq!(intent.moods, vec!["chill"]);
    assert_eq!(intent.target_duration_min, 45);

    let requests = completion.requests.lock().await;
    assert_eq!(requests.len(), 2);

    // The retry replays the conversation: system, prompt, invalid reply,
    // correction - at a lower temperature
    let retry = &requests[1];
    assert_eq!(retry.messages.len(), 4);
    assert_eq!(retry.messages[2].content, "sure! here is some JSON");
    assert!(retry.messages[3].content.contains("ONLY valid JSON"));
    assert!(retry.temperature < requests[0].temperature);
}

#[tokio::test]
async fn intent_fails_after_second_unparseable_reply() {
    let completion = ScriptedCompletion::new(vec![
        Ok("nope".to_string()),
        Ok("still nope".to_string()),
    ]);

    let err = extract_intent(&completion, "anything").await.unwrap_err();
    assert!(matches!(err, GenerateError::IntentParse));

    // Exactly one retry, never more
    assert_eq!(completion.request_count().await, 2);
}

#[tokio::test]
async fn intent_propagates_completion_failure() {
    let completion = ScriptedCompletion::new(vec![Err(CompletionError::NetworkError(
        "connection reset".to_string(),
    ))]);

    let err = extract_intent(&completion, "anything").await.unwrap_err();
    assert!(matches!(err, GenerateError::Completion(_)));
}

// =============================================================================
// Metadata generation
// =============================================================================

#[tokio::test]
async fn metadata_falls_back_on_call_error() {
    let completion = ScriptedCompletion::new(vec![Err(CompletionError::NetworkError(
        "boom".to_string(),
    ))]);

    let metadata = generate_metadata(&completion, "prompt", &Intent::default(), 5).await;

    assert_eq!(metadata.title, DEFAULT_TITLE);
    assert_eq!(metadata.description, DEFAULT_DESCRIPTION);
    assert_eq!(
        metadata.description,
        "A personalized playlist based on your preferences."
    );
}

#[tokio::test]
async fn metadata_falls_back_on_unparseable_reply() {
    let completion = ScriptedCompletion::new(vec![Ok("Here you go: Late Night Vibes".to_string())]);

    let metadata = generate_metadata(&completion, "prompt", &Intent::default(), 5).await;

    assert_eq!(metadata.title, DEFAULT_TITLE);
    assert_eq!(metadata.description, DEFAULT_DESCRIPTION);
}

#[tokio::test]
async fn metadata_uses_parsed_fields() {
    let completion = ScriptedCompletion::new(vec![Ok(
        r#"{"title":"Late Night Vibes","description":"Soulful tunes for the road."}"#.to_string(),
    )]);

    let metadata = generate_metadata(&completion, "prompt", &Intent::default(), 5).await;

    assert_eq!(metadata.title, "Late Night Vibes");
    assert_eq!(metadata.description, "Soulful tunes for the road.");
}

// =============================================================================
// End-to-end pipeline
// =============================================================================

#[tokio::test]
async fn generate_persists_achieved_duration_not_target() {
    // Catalog serves 5 tracks of 400 s; the intent asks for 30 minutes.
    // The pool is exhausted below target, so all 5 are selected.
    let catalog = FakeCatalog {
        tracks: (0..5).map(|i| track(&format!("t{i}"), 400)).collect(),
        ..Default::default()
    };
    let completion = Arc::new(ScriptedCompletion::new(vec![
        Ok(intent_reply(&["chill"], &[], 30)),
        Err(CompletionError::NetworkError("metadata down".to_string())),
    ]));

    let (pool, _dir) = setup_pool().await;
    let generator = PlaylistGenerator::new(pool.clone(), Arc::new(catalog), completion.clone());

    let playlist = generator
        .generate(Uuid::new_v4(), "30 min chill playlist")
        .await
        .unwrap();

    assert_eq!(playlist.tracks.len(), 5);

    // Total is the achieved sum, not the 1800 s target
    let sum: u32 = playlist.tracks.iter().map(|t| t.duration_sec).sum();
    assert_eq!(sum, 2000);
    assert_eq!(playlist.total_duration_sec, sum);

    // Positions are exactly 0..n-1 in output order
    for (index, track) in playlist.tracks.iter().enumerate() {
        assert_eq!(track.position, index as u32);
    }

    // Track ids are pairwise distinct
    let mut ids: Vec<&str> = playlist.tracks.iter().map(|t| t.track_id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);

    // Metadata fell back to the defaults
    assert_eq!(playlist.title, DEFAULT_TITLE);

    // Tracks are persisted with the playlist
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ?")
        .bind(&playlist.guid)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 5);
}

#[tokio::test]
async fn generate_with_empty_catalog_writes_nothing() {
    let catalog = FakeCatalog::default();
    let completion = Arc::new(ScriptedCompletion::new(vec![Ok(intent_reply(
        &["chill"],
        &[],
        30,
    ))]));

    let (pool, _dir) = setup_pool().await;
    let generator = PlaylistGenerator::new(pool.clone(), Arc::new(catalog), completion);

    let err = generator
        .generate(Uuid::new_v4(), "obscure micro-genre nobody uploads")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::NoCandidates));

    let playlists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(playlists, 0);
}

/// Catalog that fails genre+mood pair queries but serves generic ones
struct PairFailingCatalog;

#[async_trait]
impl CatalogSource for PairFailingCatalog {
    async fn search(&self, query: &str, _limit: u32) -> Result<Vec<Track>, CatalogError> {
        if query.contains(' ') {
            return Err(CatalogError::ApiError(503, "over capacity".to_string()));
        }
        Ok(vec![track("generic-1", 300), track("generic-2", 300)])
    }

    async fn track_by_id(&self, _track_id: &str) -> Result<Option<Track>, CatalogError> {
        Ok(None)
    }

    async fn trending(&self, _genre: Option<&str>, _limit: u32) -> Result<Vec<Track>, CatalogError> {
        Ok(vec![])
    }

    async fn stream_url(&self, _track_id: &str) -> Result<Option<String>, CatalogError> {
        Ok(None)
    }
}

#[tokio::test]
async fn failing_pair_searches_are_skipped_not_fatal() {
    // "pop chill" (the genre x mood pair) fails and is skipped; the
    // single-word generic queries still produce candidates.
    let completion = Arc::new(ScriptedCompletion::new(vec![
        Ok(intent_reply(&["chill"], &["pop"], 10)),
        Ok(r#"{"title":"Pop Chill","description":"d"}"#.to_string()),
    ]));

    let (pool, _dir) = setup_pool().await;
    let generator = PlaylistGenerator::new(pool, Arc::new(PairFailingCatalog), completion);

    let playlist = generator.generate(Uuid::new_v4(), "pop but chill").await.unwrap();
    assert_eq!(playlist.tracks.len(), 2);
}

#[tokio::test]
async fn failing_generic_search_aborts_the_request() {
    let catalog = FakeCatalog {
        fail_search: true,
        ..Default::default()
    };
    let completion = Arc::new(ScriptedCompletion::new(vec![Ok(intent_reply(
        &["chill"],
        &[],
        30,
    ))]));

    let (pool, _dir) = setup_pool().await;
    let generator = PlaylistGenerator::new(pool, Arc::new(catalog), completion);

    let err = generator.generate(Uuid::new_v4(), "chill").await.unwrap_err();
    assert!(matches!(err, GenerateError::Catalog(_)));
}

#[tokio::test]
async fn duplicate_candidates_collapse_to_one_row() {
    // Every query returns the same two tracks; the playlist must not
    // contain a track id twice.
    let catalog = FakeCatalog {
        tracks: vec![track("dup-a", 900), track("dup-b", 900)],
        ..Default::default()
    };
    let completion = Arc::new(ScriptedCompletion::new(vec![
        Ok(intent_reply(&["chill", "mellow"], &["lofi"], 30)),
        Ok(r#"{"title":"Mix","description":"d"}"#.to_string()),
    ]));

    let (pool, _dir) = setup_pool().await;
    let generator = PlaylistGenerator::new(pool, Arc::new(catalog), completion);

    let playlist = generator.generate(Uuid::new_v4(), "chill lofi").await.unwrap();

    let mut ids: Vec<&str> = playlist.tracks.iter().map(|t| t.track_id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), playlist.tracks.len());
    assert_eq!(playlist.tracks.len(), 2);
}
