//! Configuration loading and resolution
//!
//! Every value resolves with the same priority order:
//! 1. Command-line argument (applied by the binary, highest)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! The resolved [`AppConfig`] is passed to each gateway client at
//! construction; business logic never reads the process environment.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// SQLite database file (created on first run)
    pub database_path: PathBuf,
    pub catalog: CatalogConfig,
    pub completion: CompletionConfig,
    pub recognition: RecognitionConfig,
}

/// Music catalog (Audius discovery provider) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
}

/// Chat-completion endpoint (OpenAI-compatible) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Audio-fingerprint lookup (AcoustID) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub api_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5730".to_string(),
            database_path: default_database_path(),
            catalog: CatalogConfig::default(),
            completion: CompletionConfig::default(),
            recognition: RecognitionConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://discoveryprovider.audius.co".to_string(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model: "llama-3.1-70b-versatile".to_string(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            // Public community key from https://acoustid.org; override in production
            api_key: "TS31YbBov5".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration using the tiered resolution order.
    ///
    /// An explicitly named file (CLI or `MOODSTREAM_CONFIG`) must exist;
    /// the platform default location is optional.
    pub fn load(explicit_file: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_file {
            Self::from_file(path)?
        } else if let Ok(path) = std::env::var("MOODSTREAM_CONFIG") {
            Self::from_file(Path::new(&path))?
        } else {
            match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MOODSTREAM_BIND") {
            self.bind_address = v;
        }
        if let Ok(v) = std::env::var("MOODSTREAM_DATABASE") {
            self.database_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("MOODSTREAM_CATALOG_BASE_URL") {
            self.catalog.base_url = v;
        }
        if let Ok(v) = std::env::var("MOODSTREAM_COMPLETION_BASE_URL") {
            self.completion.base_url = v;
        }
        if let Ok(v) = std::env::var("MOODSTREAM_COMPLETION_API_KEY") {
            self.completion.api_key = v;
        }
        if let Ok(v) = std::env::var("MOODSTREAM_COMPLETION_MODEL") {
            self.completion.model = v;
        }
        if let Ok(v) = std::env::var("MOODSTREAM_ACOUSTID_API_KEY") {
            self.recognition.api_key = v;
        }
    }
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodstream").join("config.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("moodstream").join("moodstream.db"))
        .unwrap_or_else(|| PathBuf::from("./moodstream.db"))
}
