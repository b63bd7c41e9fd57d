//! Engine configuration.
//!
//! The engine reads its configuration once at construction; there is no
//! hot-reload path. Health classification thresholds live here so they are
//! not duplicated per call site.

use crate::models::{SearchField, TagRule};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Thresholds for health classification.
///
/// Status is `Critical` when error rate or disk usage exceeds the hard
/// limit, `Warning` when it exceeds the soft limit, else `Healthy`.
#[derive(Debug, Clone)]
pub struct HealthThresholds {
    /// Error-rate soft limit.
    pub error_rate_warning: f64,
    /// Error-rate hard limit.
    pub error_rate_critical: f64,
    /// Disk-usage soft limit in megabytes.
    pub disk_warning_mb: f64,
    /// Disk-usage hard limit in megabytes.
    pub disk_critical_mb: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            error_rate_warning: 0.10,
            error_rate_critical: 0.25,
            disk_warning_mb: 8192.0,
            disk_critical_mb: 16384.0,
        }
    }
}

/// Engine configuration.
///
/// Configuration values can be set via environment variables:
/// - `MUNIN_DATA_ROOT`: root of the date-partitioned archive tree
///   (default: "/var/ossec/logs/archives")
/// - `MUNIN_RETENTION_DAYS`: default retention horizon (default: 90)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the date-partitioned archive tree.
    pub data_root: PathBuf,

    /// Default retention horizon in days for cleanup.
    pub retention_days: u32,

    /// Health classification thresholds.
    pub thresholds: HealthThresholds,

    /// Fraction of invalid entries above which an integrity check emits a
    /// warning.
    pub integrity_warning_threshold: f64,

    /// Fields scanned by free-text search when the caller names none.
    pub default_search_fields: Vec<SearchField>,

    /// Tag derivation table for metadata extraction.
    pub tag_rules: Vec<TagRule>,

    /// Connection/read timeout for the remote archive transport.
    pub remote_timeout: Duration,

    /// Number of top agents/rules reported by summaries.
    pub top_n: usize,
}

impl EngineConfig {
    /// Creates a configuration rooted at the given archive tree, with
    /// defaults for everything else.
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Default::default()
        }
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `MUNIN_RETENTION_DAYS` is set but not a valid
    /// positive integer.
    pub fn from_env() -> Result<Self> {
        let data_root = std::env::var("MUNIN_DATA_ROOT")
            .unwrap_or_else(|_| "/var/ossec/logs/archives".to_string());

        let retention_days = std::env::var("MUNIN_RETENTION_DAYS")
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()?
            .unwrap_or(90);

        Ok(Self {
            data_root: PathBuf::from(data_root),
            retention_days,
            ..Default::default()
        })
    }

    /// Sets the retention horizon.
    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Sets the health thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replaces the tag derivation table.
    #[must_use]
    pub fn with_tag_rules(mut self, rules: Vec<TagRule>) -> Self {
        self.tag_rules = rules;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("/var/ossec/logs/archives"),
            retention_days: 90,
            thresholds: HealthThresholds::default(),
            integrity_warning_threshold: 0.20,
            default_search_fields: vec![SearchField::FullLog, SearchField::Location],
            tag_rules: TagRule::default_rules(),
            remote_timeout: Duration::from_secs(10),
            top_n: 5,
        }
    }
}
