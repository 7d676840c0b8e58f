//! # Estimate Server
//!
//! Serves the estimate workflow over HTTP with in-memory collaborators.
//!
//! ```text
//! estimate_server --config estimate.toml --bind 0.0.0.0:8080
//! ```

use anyhow::Context;
use clap::Parser;
use estimate_workflow::api::rest::{AppState, create_router};
use estimate_workflow::config::EngineConfig;
use estimate_workflow::telemetry;
use estimate_workflow::{Collaborators, EstimateWorkflow};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "estimate_server",
    about = "Run the repair-estimate workflow HTTP service",
    version
)]
struct Cli {
    /// Configuration file (TOML); missing files fall back to defaults
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    telemetry::init(&config.logging).context("initializing telemetry")?;

    let workflow = EstimateWorkflow::new(Collaborators::in_memory(), config.workflow_settings());
    let app = create_router(AppState::new(workflow));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("binding {}", config.server.bind_address))?;
    info!(
        address = %config.server.bind_address,
        latency_budget_ms = config.workflow.latency_budget_ms,
        max_concurrent_dispatches = config.broadcast.max_concurrent_dispatches,
        "estimate workflow ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;
    info!("estimate workflow stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
