//! Health check endpoint.
//!
//! Exposes the engine's derived health snapshot alongside basic service
//! identity, for load balancers and monitoring systems.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use engine::models::HealthStatus;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Derived health classification of the engine.
    pub status: String,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Full engine health snapshot.
    pub engine: HealthStatus,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check handler.
///
/// The snapshot is computed fresh on each request from the current corpus
/// and archive tree.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.engine().health();
    Json(HealthResponse {
        status: engine.status.to_string(),
        service: "munin-api",
        version: env!("CARGO_PKG_VERSION"),
        engine,
    })
}
