//! Retention cleanup endpoint.

use crate::routes::{engine_error_response, ApiError};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use engine::cleanup::CleanupReport;
use serde::Deserialize;

/// Request body for `POST /api/v1/cleanup`.
#[derive(Debug, Default, Deserialize)]
pub struct CleanupRequest {
    /// Retention horizon in days; defaults to the engine's configured
    /// value when absent.
    pub days_to_keep: Option<u32>,
}

/// Creates the cleanup routes.
pub fn cleanup_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/cleanup", post(run_cleanup))
        .with_state(state)
}

/// Handler for `POST /api/v1/cleanup`.
///
/// Cleanup walks the archive tree on a blocking worker; per-file removal
/// failures are reported in the response, not as an error status.
async fn run_cleanup(
    State(state): State<AppState>,
    Json(request): Json<CleanupRequest>,
) -> Result<Json<CleanupReport>, (StatusCode, Json<ApiError>)> {
    let engine = state.engine().clone();
    let report = tokio::task::spawn_blocking(move || engine.cleanup(request.days_to_keep))
        .await
        .map_err(|e| {
            engine_error_response(&engine::EngineError::Processing(format!(
                "Cleanup worker panicked: {e}"
            )))
        })?
        .map_err(|e| engine_error_response(&e))?;

    tracing::info!(
        files_removed = report.files_removed,
        errors = report.errors.len(),
        "Cleanup finished via API"
    );
    Ok(Json(report))
}
