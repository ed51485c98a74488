//! Playlist intent extraction
//!
//! Sends the user's free-text prompt to the completion service with a
//! fixed instruction template and parses the reply into an [`Intent`].
//! The completion is not schema-enforced, so every field is defaulted
//! independently when absent or of the wrong shape; a non-JSON reply is
//! retried exactly once with an explicit correction message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generator::GenerateError;
use crate::services::completion::{ChatMessage, CompletionBackend, CompletionRequest};

pub const DEFAULT_TARGET_DURATION_MIN: u32 = 30;

const INTENT_MAX_TOKENS: u32 = 500;
const INTENT_TEMPERATURE: f32 = 0.7;
const RETRY_TEMPERATURE: f32 = 0.5;

const INTENT_SYSTEM_PROMPT: &str = r#"You are a playlist generator AI. Your job is to analyze user prompts and extract structured playlist requirements.

Given a user's natural language description of their desired playlist, respond with ONLY a valid JSON object (no markdown, no explanation) with these fields:
- moods: array of mood keywords (e.g., ["chill", "energetic", "emotional"])
- genres: array of music genres (e.g., ["pop", "hip-hop", "indie"])
- targetDurationMin: target playlist duration in minutes (number)
- languagePreferences: array of language preferences (e.g., ["english", "hindi", "spanish"])
- energyCurve: array describing energy progression (e.g., ["low", "medium", "high"])
- otherConstraints: array of any other specific requirements

Example input: "late night roadtrip, hindi english mix, emotional, 45 mins"
Example output: {"moods":["late night","emotional","roadtrip"],"genres":["pop","indie"],"targetDurationMin":45,"languagePreferences":["hindi","english"],"energyCurve":["medium","medium","low"],"otherConstraints":["mix of languages"]}

Respond with ONLY the JSON object, nothing else."#;

const CORRECTION_PROMPT: &str = "Please respond with ONLY valid JSON, no other text.";

/// Energy level of one segment of the playlist's energy curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

/// Structured interpretation of a free-text playlist request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub moods: Vec<String>,
    pub genres: Vec<String>,
    pub target_duration_min: u32,
    pub language_preferences: Vec<String>,
    pub energy_curve: Vec<EnergyLevel>,
    pub other_constraints: Vec<String>,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            moods: Vec::new(),
            genres: Vec::new(),
            target_duration_min: DEFAULT_TARGET_DURATION_MIN,
            language_preferences: Vec::new(),
            energy_curve: vec![EnergyLevel::Medium],
            other_constraints: Vec::new(),
        }
    }
}

impl Intent {
    pub fn target_duration_sec(&self) -> u32 {
        self.target_duration_min.saturating_mul(60)
    }
}

/// Extract a structured intent from a free-text prompt.
///
/// Issues one completion call; on a reply that is not a JSON object,
/// replays the conversation once with the invalid reply and a
/// correction message at lower temperature. A second parse failure is
/// terminal for the request.
pub async fn extract_intent(
    completion: &dyn CompletionBackend,
    prompt: &str,
) -> Result<Intent, GenerateError> {
    let mut messages = vec![
        ChatMessage::system(INTENT_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];

    let reply = completion
        .complete(CompletionRequest {
            messages: messages.clone(),
            temperature: INTENT_TEMPERATURE,
            max_tokens: INTENT_MAX_TOKENS,
        })
        .await?;

    if let Some(intent) = parse_intent(&reply) {
        return Ok(intent);
    }

    tracing::warn!(reply = %reply, "Intent reply was not valid JSON, retrying with correction");

    messages.push(ChatMessage::assistant(reply.as_str()));
    messages.push(ChatMessage::user(CORRECTION_PROMPT));

    let retry_reply = completion
        .complete(CompletionRequest {
            messages,
            temperature: RETRY_TEMPERATURE,
            max_tokens: INTENT_MAX_TOKENS,
        })
        .await?;

    parse_intent(&retry_reply).ok_or(GenerateError::IntentParse)
}

/// Parse a completion reply into an intent.
///
/// Returns `None` when the text is not a JSON object at all (that is a
/// retryable failure); individual fields of the wrong shape silently
/// fall back to their defaults.
fn parse_intent(text: &str) -> Option<Intent> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let obj = value.as_object()?;

    Some(Intent {
        moods: string_list(obj.get("moods")),
        genres: string_list(obj.get("genres")),
        target_duration_min: obj
            .get("targetDurationMin")
            .and_then(Value::as_u64)
            .and_then(|minutes| u32::try_from(minutes).ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_TARGET_DURATION_MIN),
        language_preferences: string_list(obj.get("languagePreferences")),
        energy_curve: energy_list(obj.get("energyCurve")),
        other_constraints: string_list(obj.get("otherConstraints")),
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

fn energy_list(value: Option<&Value>) -> Vec<EnergyLevel> {
    value
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_else(|| vec![EnergyLevel::Medium])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_all_defaults() {
        let intent = parse_intent("{}").unwrap();
        assert_eq!(intent, Intent::default());
        assert_eq!(intent.target_duration_min, 30);
        assert_eq!(intent.energy_curve, vec![EnergyLevel::Medium]);
    }

    #[test]
    fn fully_populated_reply_parses() {
        let intent = parse_intent(
            r#"{"moods":["chill","emotional"],"genres":["indie"],"targetDurationMin":45,
               "languagePreferences":["english"],"energyCurve":["low","medium"],
               "otherConstraints":["no explicit lyrics"]}"#,
        )
        .unwrap();

        assert_eq!(intent.moods, vec!["chill", "emotional"]);
        assert_eq!(intent.genres, vec!["indie"]);
        assert_eq!(intent.target_duration_min, 45);
        assert_eq!(intent.language_preferences, vec!["english"]);
        assert_eq!(
            intent.energy_curve,
            vec![EnergyLevel::Low, EnergyLevel::Medium]
        );
        assert_eq!(intent.other_constraints, vec!["no explicit lyrics"]);
    }

    #[test]
    fn wrong_shape_fields_fall_back_independently() {
        let intent = parse_intent(
            r#"{"moods":"chill","genres":[1,2],"targetDurationMin":"forty","energyCurve":"high"}"#,
        )
        .unwrap();

        assert!(intent.moods.is_empty());
        assert!(intent.genres.is_empty());
        assert_eq!(intent.target_duration_min, 30);
        assert_eq!(intent.energy_curve, vec![EnergyLevel::Medium]);
    }

    #[test]
    fn non_positive_duration_is_invalid() {
        let intent = parse_intent(r#"{"targetDurationMin":0}"#).unwrap();
        assert_eq!(intent.target_duration_min, 30);

        let intent = parse_intent(r#"{"targetDurationMin":-20}"#).unwrap();
        assert_eq!(intent.target_duration_min, 30);

        // Values beyond u32 range are just as invalid
        let intent = parse_intent(r#"{"targetDurationMin":42949672960}"#).unwrap();
        assert_eq!(intent.target_duration_min, 30);
    }

    #[test]
    fn valid_but_empty_energy_curve_is_kept() {
        let intent = parse_intent(r#"{"energyCurve":[]}"#).unwrap();
        assert!(intent.energy_curve.is_empty());
    }

    #[test]
    fn non_object_replies_are_rejected() {
        assert!(parse_intent("here is your playlist!").is_none());
        assert!(parse_intent("[1, 2, 3]").is_none());
        assert!(parse_intent("").is_none());
    }
}
