//! API Module
//!
//! HTTP API layer for the render server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod render;

use axum::{
    Router,
    routing::{get, post},
};
use scenecraft_runner::RunnerConfig;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RunnerConfig>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Render endpoint
        .route("/render", post(render::render))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
