//! Log query endpoints.
//!
//! Read-only views over the cached corpus: multi-criteria filtering,
//! free-text search, aggregate statistics, summaries and integrity
//! reports. All handlers operate on a consistent corpus snapshot.

use crate::routes::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use engine::models::{LogEntry, LogFilter, SearchField};
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/v1/logs`.
#[derive(Debug, Default, Deserialize)]
pub struct LogQueryParams {
    /// Comma-separated severity labels.
    pub level: Option<String>,
    /// Comma-separated agent names.
    pub agent: Option<String>,
    /// Minimum numeric rule level.
    pub severity_min: Option<u8>,
    /// Free-text criterion (scans log content and location).
    pub q: Option<String>,
    /// Start of time range (RFC 3339, inclusive).
    pub start: Option<DateTime<Utc>>,
    /// End of time range (RFC 3339, exclusive).
    pub end: Option<DateTime<Utc>>,
    /// Maximum number of logs to return.
    pub limit: Option<usize>,
    /// Number of logs to skip (for pagination).
    pub offset: Option<usize>,
}

/// Query parameters for `GET /api/v1/logs/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// The search query. Empty returns everything.
    #[serde(default)]
    pub q: String,
    /// Comma-separated field names to scan; defaults to the engine's
    /// configured fields.
    pub fields: Option<String>,
}

/// Response for log listing endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogListResponse {
    /// The matching logs.
    pub logs: Vec<LogEntry>,
    /// Total count of matching logs before limit/offset.
    pub total_count: usize,
    /// Number of logs in this response.
    pub returned_count: usize,
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl LogQueryParams {
    fn into_filter(self) -> LogFilter {
        let mut filter = LogFilter::new();
        if let Some(ref levels) = self.level {
            filter.levels = Some(split_csv(levels));
        }
        if let Some(ref agents) = self.agent {
            filter.agents = Some(split_csv(agents));
        }
        filter.severity_min = self.severity_min;
        filter.search_text = self.q;
        filter.start_date = self.start;
        filter.end_date = self.end;
        filter
    }
}

/// Creates the log query routes.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/logs", get(list_logs))
        .route("/api/v1/logs/search", get(search_logs))
        .route("/api/v1/logs/stats", get(log_stats))
        .route("/api/v1/logs/summary", get(log_summary))
        .route("/api/v1/logs/integrity", get(log_integrity))
        .with_state(state)
}

/// Handler for `GET /api/v1/logs`.
async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogQueryParams>,
) -> Json<LogListResponse> {
    let limit = params.limit;
    let offset = params.offset.unwrap_or(0);
    let filter = params.into_filter();

    let matched = state.engine().filter(&filter);
    let total_count = matched.len();
    let logs: Vec<LogEntry> = matched
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    tracing::debug!(total = total_count, returned = logs.len(), "Logs filtered");
    Json(LogListResponse {
        returned_count: logs.len(),
        logs,
        total_count,
    })
}

/// Handler for `GET /api/v1/logs/search`.
async fn search_logs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<LogListResponse>, (StatusCode, Json<ApiError>)> {
    let fields: Option<Vec<SearchField>> = match params.fields {
        Some(ref raw) => {
            let parsed: Result<Vec<SearchField>, String> =
                split_csv(raw).iter().map(|f| f.parse()).collect();
            Some(parsed.map_err(|message| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiError {
                        error: "validation_error".to_string(),
                        message,
                    }),
                )
            })?)
        }
        None => None,
    };

    let logs = state.engine().search(&params.q, fields.as_deref());
    Ok(Json(LogListResponse {
        total_count: logs.len(),
        returned_count: logs.len(),
        logs,
    }))
}

/// Handler for `GET /api/v1/logs/stats`.
async fn log_stats(State(state): State<AppState>) -> Json<engine::models::LogStats> {
    Json(state.engine().stats())
}

/// Handler for `GET /api/v1/logs/summary`.
async fn log_summary(State(state): State<AppState>) -> Json<engine::analysis::LogSummary> {
    Json(state.engine().summary())
}

/// Handler for `GET /api/v1/logs/integrity`.
async fn log_integrity(State(state): State<AppState>) -> Json<engine::analysis::IntegrityReport> {
    Json(state.engine().validate_integrity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::io::Write;
    use tower::ServiceExt;

    fn seed_archive(root: &std::path::Path) {
        let today = chrono::Utc::now().date_naive();
        let dir = root.join(today.format("%Y/%b").to_string());
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("ossec-archive-{}.json", today.format("%d")));
        let mut file = std::fs::File::create(path).unwrap();
        let lines = [
            r#"{"timestamp": "2024-01-15T08:00:00Z", "full_log": "sshd: Failed password for root", "level": "warning", "agent": {"name": "web-01"}, "rule": {"id": "5710", "level": 5}}"#,
            r#"{"timestamp": "2024-01-15T09:00:00Z", "full_log": "sshd: Accepted password for deploy", "level": "info", "agent": {"name": "web-01"}, "rule": {"id": "5715", "level": 3}}"#,
            r#"{"timestamp": "2024-01-15T10:00:00Z", "full_log": "kernel: Out of memory", "level": "error", "agent": {"name": "db-01"}, "rule": {"id": "1002", "level": 2}}"#,
        ];
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
    }

    fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        seed_archive(dir.path());
        let state = AppState::with_data_root(dir.path());
        state.engine().reload_days(1, None, None).unwrap();
        (logs_routes(state), dir)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_list_logs_unfiltered() {
        let (app, _dir) = test_app();
        let (status, body) = get_json(app, "/api/v1/logs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 3);
        assert_eq!(body["returned_count"], 3);
    }

    #[tokio::test]
    async fn test_list_logs_by_level() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs?level=warning").await;
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["logs"][0]["level"], "warning");
    }

    #[tokio::test]
    async fn test_list_logs_severity_and_agent() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs?agent=web-01&severity_min=4").await;
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["logs"][0]["rule"]["id"], "5710");
    }

    #[tokio::test]
    async fn test_list_logs_pagination() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs?limit=1&offset=1").await;
        assert_eq!(body["total_count"], 3);
        assert_eq!(body["returned_count"], 1);
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app.clone(), "/api/v1/logs/search?q=PASSWORD").await;
        assert_eq!(body["total_count"], 2);
        let (_, lower) = get_json(app, "/api/v1/logs/search?q=password").await;
        assert_eq!(lower["total_count"], 2);
    }

    #[tokio::test]
    async fn test_search_empty_query_returns_all() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs/search").await;
        assert_eq!(body["total_count"], 3);
    }

    #[tokio::test]
    async fn test_search_restricted_fields() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs/search?q=web&fields=agent_name").await;
        assert_eq!(body["total_count"], 2);
    }

    #[tokio::test]
    async fn test_search_unknown_field_rejected() {
        let (app, _dir) = test_app();
        let (status, body) = get_json(app, "/api/v1/logs/search?q=x&fields=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (app, _dir) = test_app();
        let (status, body) = get_json(app, "/api/v1/logs/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_logs"], 3);
        assert_eq!(body["levels"]["warning"], 1);
    }

    #[tokio::test]
    async fn test_summary_endpoint() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs/summary").await;
        assert_eq!(body["overview"]["total_logs"], 3);
        assert_eq!(body["overview"]["distinct_agents"], 2);
        assert_eq!(body["top_agents"][0]["name"], "web-01");
    }

    #[tokio::test]
    async fn test_integrity_endpoint() {
        let (app, _dir) = test_app();
        let (_, body) = get_json(app, "/api/v1/logs/integrity").await;
        assert_eq!(body["total_logs"], 3);
        assert_eq!(body["invalid_logs"], 0);
    }
}
