//! Reload progress and health status types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a reload operation.
///
/// Transitions: `Pending -> Running -> {Completed | Failed}`. A status is
/// immutable once it reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadState {
    /// Created but not yet started.
    Pending,
    /// Work in progress.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with a terminal error.
    Failed,
}

impl std::fmt::Display for ReloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Progress record for one reload operation.
///
/// Updated in place as work proceeds; progress is monotonically
/// non-decreasing within one reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadStatus {
    /// Current state of the operation.
    pub state: ReloadState,

    /// Human-readable description of the current situation.
    pub message: String,

    /// Completion fraction in `[0.0, 1.0]`.
    pub progress: f64,

    /// Number of log entries processed so far.
    pub logs_processed: usize,

    /// Total entries loaded (equals `logs_processed` once terminal).
    pub total_logs: usize,

    /// When the operation started.
    pub start_time: DateTime<Utc>,

    /// When the operation reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ReloadStatus {
    /// Creates a pending status.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            state: ReloadState::Pending,
            message: "Reload pending".to_string(),
            progress: 0.0,
            logs_processed: 0,
            total_logs: 0,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    /// Creates a running status.
    #[must_use]
    pub fn running(message: impl Into<String>) -> Self {
        Self {
            state: ReloadState::Running,
            message: message.into(),
            ..Self::pending()
        }
    }

    /// Marks the status completed with full progress.
    pub fn complete(&mut self, message: impl Into<String>) {
        self.state = ReloadState::Completed;
        self.message = message.into();
        self.progress = 1.0;
        self.end_time = Some(Utc::now());
    }

    /// Marks the status failed, preserving the partial progress counters.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = ReloadState::Failed;
        self.message = message.into();
        self.end_time = Some(Utc::now());
    }

    /// Returns true once the status is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ReloadState::Completed | ReloadState::Failed)
    }

    /// Duration of the operation so far, or total duration once terminal.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end_time.unwrap_or_else(Utc::now) - self.start_time
    }
}

/// Derived health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// All indicators within limits.
    Healthy,
    /// At least one indicator approaching its hard limit.
    Warning,
    /// At least one indicator beyond its hard limit.
    Critical,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Point-in-time health snapshot, computed fresh on request from the
/// current cache and filesystem state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall classification.
    pub status: HealthState,

    /// When the corpus was last reloaded, if ever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reload: Option<DateTime<Utc>>,

    /// Number of entries in the in-memory corpus.
    pub total_logs_cached: usize,

    /// Estimated corpus size in megabytes.
    pub cache_size_mb: f64,

    /// Average processing time per entry during the last reload, in
    /// milliseconds.
    pub avg_processing_time_ms: f64,

    /// Fraction of cached entries failing validation, in `[0.0, 1.0]`.
    pub error_rate: f64,

    /// Size of the on-disk archive tree in megabytes.
    pub disk_usage_mb: f64,

    /// Estimated engine memory footprint in megabytes.
    pub memory_usage_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_state_display() {
        assert_eq!(ReloadState::Pending.to_string(), "pending");
        assert_eq!(ReloadState::Running.to_string(), "running");
        assert_eq!(ReloadState::Completed.to_string(), "completed");
        assert_eq!(ReloadState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_status_lifecycle() {
        let mut status = ReloadStatus::running("Loading 3 days");
        assert!(!status.is_terminal());

        status.logs_processed = 42;
        status.total_logs = 42;
        status.complete("Done");

        assert!(status.is_terminal());
        assert_eq!(status.state, ReloadState::Completed);
        assert!((status.progress - 1.0).abs() < f64::EPSILON);
        assert!(status.end_time.is_some());
    }

    #[test]
    fn test_fail_preserves_partial_counters() {
        let mut status = ReloadStatus::running("Loading");
        status.logs_processed = 10;
        status.progress = 0.5;
        status.fail("Remote unreachable");

        assert_eq!(status.state, ReloadState::Failed);
        assert_eq!(status.logs_processed, 10);
        assert!((status.progress - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&ReloadState::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&HealthState::Critical).unwrap(),
            "\"critical\""
        );
    }
}
