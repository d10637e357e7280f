//! API Error Handling
//!
//! Unified error types and conversion for API responses.
//!
//! Render failures are answered with a [`RenderReply::Failed`] body so
//! clients can tell "the server refused or broke" apart from "the server is
//! not there". Malformed requests get a plain error body instead.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scenecraft_core::dto::render::RenderReply;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Rejected(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            ApiError::Rejected(message) => {
                tracing::warn!("Render rejected: {}", message);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(RenderReply::Failed { message }),
                )
                    .into_response()
            }
            ApiError::InternalError(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RenderReply::Failed { message }),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
