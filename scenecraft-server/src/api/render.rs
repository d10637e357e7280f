//! Render API Handlers
//!
//! HTTP endpoint for rendering scripts.

use axum::{Json, extract::State};
use scenecraft_core::dto::render::{RenderReply, RenderRequest};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::render_service;

/// POST /render
/// Render a script with the engine
pub async fn render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> ApiResult<Json<RenderReply>> {
    tracing::info!(
        "Render requested: scene={:?}, quality={}",
        req.scene_name,
        req.quality
    );

    let response = render_service::render(&state.config, req)
        .await
        .map_err(|e| match e {
            render_service::RenderError::ValidationError(msg) => ApiError::BadRequest(msg),
            render_service::RenderError::UnsafeCode(msg) => ApiError::Rejected(msg),
            render_service::RenderError::InternalError(msg) => ApiError::InternalError(msg),
        })?;

    Ok(Json(RenderReply::Rendered(response)))
}
