//! Investor Onboarding
//!
//! Application, KYC and agreement service for the investor website, with a
//! live progress tracker derived from the onboarding stores.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod onboarding;
pub mod security;
pub mod services;
pub mod state;

use api::ApiServer;
use config::AppConfig;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize and run the service until Ctrl-C
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "investor_onboarding=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Investor Onboarding...");

    let config = AppConfig::from_env()?;
    let state = Arc::new(AppState::new(config)?);

    // Picks up writes made outside this process
    let poller = state
        .config
        .poll_interval()
        .map(|interval| state.progress.spawn_poller(interval));

    let mut server = ApiServer::new(state.clone());
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.stop();
    if let Some(poller) = poller {
        poller.abort();
    }

    Ok(())
}
