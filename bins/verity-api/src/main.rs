mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use verity_common::catalog::Catalog;
use verity_common::config::EngineConfig;
use verity_engine::recorder::SubmissionRecorder;
use verity_engine::Grader;

pub struct AppState {
    pub catalog: Catalog,
    pub grader: Grader,
    pub recorder: Option<SubmissionRecorder>,
    /// Service credential used when a request carries no session token
    pub recorder_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Verity API booting...");

    let config = EngineConfig::from_env()?;

    let catalog = Catalog::load(&config.catalog_path)?;
    info!(
        "Loaded {} challenges from {}",
        catalog.len(),
        config.catalog_path.display()
    );

    let recorder = SubmissionRecorder::from_config(&config);
    if recorder.is_none() {
        warn!("RECORDER_URL not set; passing submissions cannot be recorded");
    }

    info!(
        timeout_ms = config.timeout.as_millis() as u64,
        interpreter = %config.node_command.join(" "),
        remote = %config.remote_url,
        "Grading engine configured"
    );

    let state = Arc::new(AppState {
        catalog,
        grader: Grader::from_config(&config),
        recorder,
        recorder_token: config.recorder_token.clone(),
    });

    // Build router
    let app = Router::new().merge(routes::routes()).with_state(state);

    // Start server
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
