//! Scenecraft Render Server
//!
//! Renders Manim scripts on request. The pipeline's execution backend uses it
//! as its primary transport and falls back to rendering locally when it is
//! unreachable.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod service;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scenecraft_server=info,scenecraft_runner=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Scenecraft Render Server...");

    let config = ServerConfig::from_env()?;
    config.validate()?;

    tracing::info!(
        "Work root: {}, render timeout: {}s",
        config.runner.work_root.display(),
        config.runner.render_timeout.as_secs()
    );

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        config: Arc::new(config.runner),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
