//! Reload endpoints.
//!
//! Triggers corpus reloads and exposes the progress of the most recent
//! one. Day-count reloads run on a background worker and return
//! immediately; explicit date-range reloads run to completion before
//! responding. A second reload while one is in flight yields 409.

use crate::routes::{engine_error_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use engine::models::ReloadStatus;
use engine::store::SshCredentials;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Remote credentials supplied with a reload request.
///
/// Passed straight to the engine for the duration of the reload; never
/// stored.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Remote username.
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,

    /// Remote host.
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Remote SSH port (default 22).
    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Password, for password authentication.
    pub password: Option<String>,

    /// Private key path, for key authentication.
    pub key_path: Option<String>,
}

fn default_ssh_port() -> u16 {
    22
}

impl CredentialsRequest {
    fn into_credentials(self) -> Result<SshCredentials, String> {
        if self.password.is_none() && self.key_path.is_none() {
            return Err("Credentials need a password or a key path".to_string());
        }
        Ok(SshCredentials {
            username: self.username,
            host: self.host,
            port: self.port,
            password: self.password,
            key_path: self.key_path.map(Into::into),
        })
    }
}

/// Request body for `POST /api/v1/reload`.
///
/// Either `days` or both `start` and `end` must be provided.
#[derive(Debug, Deserialize)]
pub struct ReloadRequest {
    /// Reload the most recent N days on a background worker.
    pub days: Option<u32>,
    /// Start of an explicit date range (inclusive).
    pub start: Option<NaiveDate>,
    /// End of an explicit date range (exclusive).
    pub end: Option<NaiveDate>,
    /// Remote credentials; absent means the local archive tree.
    pub credentials: Option<CredentialsRequest>,
}

/// Response for reload operations.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    /// Whether the request was accepted.
    pub accepted: bool,
    /// Current (possibly terminal) status of the reload.
    pub status: ReloadStatus,
}

/// Creates the reload routes.
pub fn reload_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/reload", post(start_reload))
        .route("/api/v1/reload/status", get(reload_status))
        .with_state(state)
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: "validation_error".to_string(),
            message: message.into(),
        }),
    )
}

/// Handler for `POST /api/v1/reload`.
async fn start_reload(
    State(state): State<AppState>,
    Json(request): Json<ReloadRequest>,
) -> Result<(StatusCode, Json<ReloadResponse>), (StatusCode, Json<ApiError>)> {
    let credentials = match request.credentials {
        Some(req) => {
            req.validate()
                .map_err(|e| bad_request(e.to_string()))?;
            Some(req.into_credentials().map_err(bad_request)?)
        }
        None => None,
    };

    match (request.days, request.start, request.end) {
        (Some(days), None, None) => {
            let handle = state
                .engine()
                .reload_background(days, credentials, None)
                .map_err(|e| engine_error_response(&e))?;
            tracing::info!(days, "Background reload accepted");
            Ok((
                StatusCode::ACCEPTED,
                Json(ReloadResponse {
                    accepted: true,
                    status: handle.status(),
                }),
            ))
        }
        (None, Some(start), Some(end)) => {
            let engine = state.engine().clone();
            let status = tokio::task::spawn_blocking(move || {
                engine.reload_range(start, end, credentials, None)
            })
            .await
            .map_err(|e| {
                engine_error_response(&engine::EngineError::Processing(format!(
                    "Reload worker panicked: {e}"
                )))
            })?
            .map_err(|e| engine_error_response(&e))?;
            Ok((
                StatusCode::OK,
                Json(ReloadResponse {
                    accepted: true,
                    status,
                }),
            ))
        }
        _ => Err(bad_request(
            "Provide either 'days' or both 'start' and 'end'",
        )),
    }
}

/// Handler for `GET /api/v1/reload/status`.
async fn reload_status(
    State(state): State<AppState>,
) -> Result<Json<ReloadStatus>, (StatusCode, Json<ApiError>)> {
    state.engine().reload_status().map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "not_found".to_string(),
                message: "No reload has been started yet".to_string(),
            }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use std::io::Write;
    use tower::ServiceExt;

    fn seed_archive(root: &std::path::Path) {
        let today = chrono::Utc::now().date_naive();
        let dir = root.join(today.format("%Y/%b").to_string());
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("ossec-archive-{}.json", today.format("%d")));
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(
            file,
            r#"{{"timestamp": "2024-01-15T08:00:00Z", "full_log": "event", "level": "info"}}"#
        )
        .unwrap();
    }

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        seed_archive(dir.path());
        (AppState::with_data_root(dir.path()), dir)
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_reload_days_accepted() {
        let (state, _dir) = test_state();
        let app = reload_routes(state.clone());

        let (status, body) = post_json(app, "/api/v1/reload", r#"{"days": 1}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["accepted"], true);

        // Wait for the background worker to finish and check the corpus.
        for _ in 0..100 {
            if state
                .engine()
                .reload_status()
                .is_some_and(|s| s.is_terminal())
            {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(state.engine().corpus().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_range_inverted_reports_failed() {
        let (state, _dir) = test_state();
        let app = reload_routes(state);

        let (status, body) = post_json(
            app,
            "/api/v1/reload",
            r#"{"start": "2024-01-15", "end": "2024-01-10"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["state"], "failed");
    }

    #[tokio::test]
    async fn test_reload_zero_days_rejected() {
        let (state, _dir) = test_state();
        let app = reload_routes(state);

        let (status, body) = post_json(app, "/api/v1/reload", r#"{"days": 0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_reload_requires_days_or_range() {
        let (state, _dir) = test_state();
        let app = reload_routes(state);

        let (status, _) = post_json(app, "/api/v1/reload", r#"{}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reload_credentials_without_secret_rejected() {
        let (state, _dir) = test_state();
        let app = reload_routes(state);

        let body = r#"{"days": 1, "credentials": {"username": "ossec", "host": "siem.example"}}"#;
        let (status, response) = post_json(app, "/api/v1/reload", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["message"]
            .as_str()
            .unwrap()
            .contains("password or a key path"));
    }

    #[tokio::test]
    async fn test_reload_status_before_any_reload() {
        let (state, _dir) = test_state();
        let app = reload_routes(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reload/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_status_after_range_reload() {
        let (state, _dir) = test_state();
        let app = reload_routes(state.clone());

        let today = chrono::Utc::now().date_naive();
        let body = format!(
            r#"{{"start": "{}", "end": "{}"}}"#,
            today,
            today + chrono::Duration::days(1)
        );
        let (status, _) = post_json(app.clone(), "/api/v1/reload", &body).await;
        assert_eq!(status, StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reload/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let status: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status["state"], "completed");
    }
}
