//! Shared test fixtures: in-process fake backends and app setup
#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use moodstream_api::services::catalog::{CatalogError, CatalogSource, Track};
use moodstream_api::services::completion::{CompletionBackend, CompletionError, CompletionRequest};
use moodstream_api::services::recognition::{FingerprintLookup, Recognition, RecognitionError};
use moodstream_api::{build_router, AppState};

/// Stable user id for request headers
pub const TEST_USER: &str = "7d9f1a80-3c2e-4b5f-9b6a-111111111111";

pub fn track(id: &str, duration_sec: u32) -> Track {
    Track {
        track_id: id.to_string(),
        title: format!("Track {id}"),
        artist_name: "Artist".to_string(),
        duration_sec,
        thumbnail_url: None,
        genre: None,
        tags: vec![],
    }
}

/// Intent reply as the completion service would produce it
pub fn intent_reply(moods: &[&str], genres: &[&str], duration_min: u32) -> String {
    serde_json::json!({
        "moods": moods,
        "genres": genres,
        "targetDurationMin": duration_min,
        "languagePreferences": [],
        "energyCurve": ["medium"],
        "otherConstraints": [],
    })
    .to_string()
}

/// Catalog fake serving a fixed track list for every query
#[derive(Default)]
pub struct FakeCatalog {
    pub tracks: Vec<Track>,
    pub fail_search: bool,
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn search(&self, _query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        if self.fail_search {
            return Err(CatalogError::NetworkError("connection refused".to_string()));
        }
        Ok(self.tracks.iter().take(limit as usize).cloned().collect())
    }

    async fn track_by_id(&self, track_id: &str) -> Result<Option<Track>, CatalogError> {
        Ok(self.tracks.iter().find(|t| t.track_id == track_id).cloned())
    }

    async fn trending(&self, _genre: Option<&str>, limit: u32) -> Result<Vec<Track>, CatalogError> {
        Ok(self.tracks.iter().take(limit as usize).cloned().collect())
    }

    async fn stream_url(&self, track_id: &str) -> Result<Option<String>, CatalogError> {
        Ok(self
            .tracks
            .iter()
            .find(|t| t.track_id == track_id)
            .map(|t| format!("https://cdn.example/{}/stream", t.track_id)))
    }
}

/// Completion fake that pops scripted replies in order and records
/// every request it receives
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().await.push(request);
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::NetworkError("no scripted reply".to_string())))
    }
}

#[derive(Default)]
pub struct FakeRecognizer {
    pub result: Option<Recognition>,
}

#[async_trait]
impl FingerprintLookup for FakeRecognizer {
    async fn recognize(
        &self,
        _fingerprint: &str,
        _duration_sec: u64,
    ) -> Result<Option<Recognition>, RecognitionError> {
        Ok(self.result.clone())
    }
}

/// Fresh database for pipeline-level tests; keep the TempDir alive
pub async fn setup_pool() -> (SqlitePool, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = moodstream_common::db::init_database(&dir.path().join("moodstream.db"))
        .await
        .expect("init database");
    (pool, dir)
}

pub struct TestApp {
    pub router: axum::Router,
    pub pool: SqlitePool,
    _dir: tempfile::TempDir,
}

pub async fn setup_app(catalog: FakeCatalog, completion: ScriptedCompletion) -> TestApp {
    setup_app_with(catalog, completion, FakeRecognizer::default()).await
}

pub async fn setup_app_with(
    catalog: FakeCatalog,
    completion: ScriptedCompletion,
    recognizer: FakeRecognizer,
) -> TestApp {
    let (pool, dir) = setup_pool().await;
    let state = AppState::new(
        pool.clone(),
        Arc::new(catalog),
        Arc::new(completion),
        Arc::new(recognizer),
    );

    TestApp {
        router: build_router(state),
        pool,
        _dir: dir,
    }
}
