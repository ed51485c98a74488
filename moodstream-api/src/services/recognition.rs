//! Audio-fingerprint lookup (AcoustID) with MusicBrainz enrichment
//!
//! The client receives a pre-computed chromaprint fingerprint, asks
//! AcoustID for matching recordings, and best-effort enriches the top
//! match with album metadata from MusicBrainz. Enrichment failures are
//! absorbed; the basic match is still returned.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use moodstream_common::config::RecognitionConfig;

const ACOUSTID_BASE_URL: &str = "https://api.acoustid.org/v2/lookup";
const MUSICBRAINZ_BASE_URL: &str = "https://musicbrainz.org/ws/2";
const USER_AGENT: &str = "moodstream/0.1.0 (https://github.com/moodstream/moodstream)";
const ACOUSTID_RATE_LIMIT_MS: u64 = 334; // 3 requests per second
const MUSICBRAINZ_RATE_LIMIT_MS: u64 = 1000; // 1 request per second

/// Recognition client errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// A recognized recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub release_date: Option<String>,
    pub duration_sec: Option<u64>,
    pub confidence: Option<f64>,
}

/// Fingerprint lookup used by the recognize endpoint
#[async_trait]
pub trait FingerprintLookup: Send + Sync {
    /// Look up a chromaprint fingerprint; `Ok(None)` means no match
    async fn recognize(
        &self,
        fingerprint: &str,
        duration_sec: u64,
    ) -> Result<Option<Recognition>, RecognitionError>;
}

/// AcoustID lookup response
#[derive(Debug, Clone, Deserialize)]
struct AcoustIdResponse {
    status: String,
    #[serde(default)]
    results: Vec<AcoustIdResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct AcoustIdResult {
    score: f64,
    recordings: Option<Vec<AcoustIdRecording>>,
}

#[derive(Debug, Clone, Deserialize)]
struct AcoustIdRecording {
    id: Option<String>, // MusicBrainz Recording MBID
    title: Option<String>,
    artists: Option<Vec<AcoustIdArtist>>,
}

#[derive(Debug, Clone, Deserialize)]
struct AcoustIdArtist {
    name: String,
}

/// MusicBrainz recording lookup (subset used for enrichment)
#[derive(Debug, Clone, Deserialize)]
struct MbRecording {
    /// Recording length in milliseconds
    length: Option<u64>,
    releases: Option<Vec<MbRelease>>,
}

#[derive(Debug, Clone, Deserialize)]
struct MbRelease {
    title: String,
    date: Option<String>,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// AcoustID client with MusicBrainz enrichment
pub struct AcoustIdClient {
    http_client: reqwest::Client,
    api_key: String,
    acoustid_limiter: Arc<RateLimiter>,
    musicbrainz_limiter: Arc<RateLimiter>,
}

impl AcoustIdClient {
    pub fn new(config: &RecognitionConfig) -> Result<Self, RecognitionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            acoustid_limiter: Arc::new(RateLimiter::new(ACOUSTID_RATE_LIMIT_MS)),
            musicbrainz_limiter: Arc::new(RateLimiter::new(MUSICBRAINZ_RATE_LIMIT_MS)),
        })
    }

    async fn lookup_fingerprint(
        &self,
        fingerprint: &str,
        duration_sec: u64,
    ) -> Result<AcoustIdResponse, RecognitionError> {
        self.acoustid_limiter.wait().await;

        let params = [
            ("client", self.api_key.as_str()),
            ("meta", "recordings releasegroups"),
            ("duration", &duration_sec.to_string()),
            ("fingerprint", fingerprint),
        ];

        tracing::debug!(duration_sec = duration_sec, "Querying AcoustID API");

        let response = self
            .http_client
            .post(ACOUSTID_BASE_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(RecognitionError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| RecognitionError::ParseError(e.to_string()))
    }

    /// Best-effort album/date/length enrichment from MusicBrainz
    async fn enrich_from_musicbrainz(&self, mbid: &str, recognition: &mut Recognition) {
        self.musicbrainz_limiter.wait().await;

        let url = format!(
            "{}/recording/{}?inc=artist-credits+releases&fmt=json",
            MUSICBRAINZ_BASE_URL, mbid
        );

        let result = async {
            let response = self
                .http_client
                .get(&url)
                .send()
                .await
                .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(RecognitionError::ApiError(status.as_u16(), error_text));
            }

            response
                .json::<MbRecording>()
                .await
                .map_err(|e| RecognitionError::ParseError(e.to_string()))
        }
        .await;

        match result {
            Ok(recording) => {
                if let Some(release) = recording.releases.and_then(|r| r.into_iter().next()) {
                    recognition.album = Some(release.title);
                    recognition.release_date = release.date;
                }
                if let Some(length_ms) = recording.length {
                    recognition.duration_sec = Some(length_ms / 1000);
                }
            }
            Err(e) => {
                tracing::warn!(mbid = %mbid, error = %e, "MusicBrainz metadata fetch failed");
            }
        }
    }
}

#[async_trait]
impl FingerprintLookup for AcoustIdClient {
    async fn recognize(
        &self,
        fingerprint: &str,
        duration_sec: u64,
    ) -> Result<Option<Recognition>, RecognitionError> {
        let response = self.lookup_fingerprint(fingerprint, duration_sec).await?;

        if response.status != "ok" || response.results.is_empty() {
            tracing::debug!(status = %response.status, "AcoustID returned no results");
            return Ok(None);
        }

        // Results arrive ordered by score; take the best match
        let best = match response.results.into_iter().next() {
            Some(result) => result,
            None => return Ok(None),
        };

        let recording = match best.recordings.and_then(|r| r.into_iter().next()) {
            Some(recording) => recording,
            None => return Ok(None),
        };

        let mut recognition = Recognition {
            title: recording.title.unwrap_or_else(|| "Unknown".to_string()),
            artist: recording
                .artists
                .and_then(|a| a.into_iter().next())
                .map(|a| a.name)
                .unwrap_or_else(|| "Unknown Artist".to_string()),
            album: None,
            release_date: None,
            duration_sec: None,
            confidence: Some(best.score),
        };

        if let Some(mbid) = recording.id.filter(|id| !id.is_empty()) {
            self.enrich_from_musicbrainz(&mbid, &mut recognition).await;
        }

        tracing::info!(
            title = %recognition.title,
            artist = %recognition.artist,
            confidence = ?recognition.confidence,
            "Fingerprint recognized"
        );

        Ok(Some(recognition))
    }
}
