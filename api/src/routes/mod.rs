//! API route modules.

pub mod cleanup;
pub mod health;
pub mod logs;
pub mod reload;

use axum::http::StatusCode;
use axum::Json;
use engine::EngineError;
use serde::{Deserialize, Serialize};

/// Error response body shared by all routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// Maps an engine error to an HTTP status and response body.
pub(crate) fn engine_error_response(e: &EngineError) -> (StatusCode, Json<ApiError>) {
    let (status, kind) = match e {
        EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        EngineError::Busy => (StatusCode::CONFLICT, "busy"),
        EngineError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport_error"),
        EngineError::Io(_) | EngineError::Processing(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    (
        status,
        Json(ApiError {
            error: kind.to_string(),
            message: e.to_string(),
        }),
    )
}
