//! Playlist title and description generation
//!
//! A second completion request proposes a short title and description
//! for the finished playlist. This path never fails the overall
//! request: any call or parse error falls back to fixed defaults.

use serde_json::Value;

use crate::generator::Intent;
use crate::services::completion::{
    ChatMessage, CompletionBackend, CompletionError, CompletionRequest,
};

pub const DEFAULT_TITLE: &str = "AI Generated Playlist";
pub const DEFAULT_DESCRIPTION: &str = "A personalized playlist based on your preferences.";

/// Fallback for a parsed reply that is missing the description field
const FIELD_FALLBACK_DESCRIPTION: &str = "A playlist created just for you.";

const METADATA_MAX_TOKENS: u32 = 200;
const METADATA_TEMPERATURE: f32 = 0.8;

const METADATA_SYSTEM_PROMPT: &str = r#"You are a creative playlist naming assistant. Given a user's playlist request and the extracted intent, generate a catchy title and brief description.

Respond with ONLY a valid JSON object with these fields:
- title: a short, catchy playlist title (max 50 characters)
- description: a brief 1-2 sentence description

Example: {"title":"Late Night Vibes","description":"Emotional Hindi-English mix perfect for late night roadtrips. 45 minutes of soulful tunes."}"#;

/// Generated playlist title and description
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMetadata {
    pub title: String,
    pub description: String,
}

impl PlaylistMetadata {
    fn fallback() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Generate a title and description for the playlist; never fails.
pub async fn generate_metadata(
    completion: &dyn CompletionBackend,
    prompt: &str,
    intent: &Intent,
    track_count: usize,
) -> PlaylistMetadata {
    match request_metadata(completion, prompt, intent, track_count).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(error = %e, "Metadata generation failed, using defaults");
            PlaylistMetadata::fallback()
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum MetadataError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("metadata reply was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

async fn request_metadata(
    completion: &dyn CompletionBackend,
    prompt: &str,
    intent: &Intent,
    track_count: usize,
) -> Result<PlaylistMetadata, MetadataError> {
    let summary = format!(
        "User prompt: \"{}\"\nMoods: {}\nGenres: {}\nDuration: {} minutes\nTracks: {}\n\nGenerate title and description:",
        prompt,
        intent.moods.join(", "),
        intent.genres.join(", "),
        intent.target_duration_min,
        track_count
    );

    let reply = completion
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage::system(METADATA_SYSTEM_PROMPT),
                ChatMessage::user(summary),
            ],
            temperature: METADATA_TEMPERATURE,
            max_tokens: METADATA_MAX_TOKENS,
        })
        .await?;

    let value: Value = serde_json::from_str(reply.trim())?;

    Ok(PlaylistMetadata {
        title: non_empty_string(value.get("title")).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: non_empty_string(value.get("description"))
            .unwrap_or_else(|| FIELD_FALLBACK_DESCRIPTION.to_string()),
    })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
