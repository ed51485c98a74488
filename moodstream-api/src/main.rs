//! moodstream-api - Music streaming backend
//!
//! Stateless HTTP service that proxies the music catalog, the
//! chat-completion endpoint and the audio-fingerprint lookup service,
//! and persists user records in SQLite. Hosts the AI playlist
//! generation pipeline.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use moodstream_api::services::catalog::AudiusClient;
use moodstream_api::services::completion::GroqClient;
use moodstream_api::services::recognition::AcoustIdClient;
use moodstream_api::{build_router, AppState};
use moodstream_common::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "moodstream-api", about = "Music streaming backend service")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Bind address, e.g. 127.0.0.1:5730 (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting moodstream-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    // Config resolution: CLI > environment > TOML file > defaults
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }

    if config.completion.api_key.is_empty() {
        warn!("Completion API key not configured; AI playlist generation will fail");
    }

    info!("Database: {}", config.database_path.display());
    let pool = moodstream_common::db::init_database(&config.database_path).await?;
    info!("Database connection established");

    let catalog = Arc::new(AudiusClient::new(&config.catalog)?);
    let completion = Arc::new(GroqClient::new(&config.completion)?);
    let recognizer = Arc::new(AcoustIdClient::new(&config.recognition)?);

    let state = AppState::new(pool, catalog, completion, recognizer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("moodstream-api listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
