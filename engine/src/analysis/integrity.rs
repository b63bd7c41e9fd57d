//! Corpus integrity checking and health classification.

use crate::config::HealthThresholds;
use crate::models::{HealthState, LogEntry};
use serde::{Deserialize, Serialize};

/// Result of validating a collection of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Total entries checked.
    pub total_logs: usize,
    /// Entries passing validation.
    pub valid_logs: usize,
    /// Entries failing validation.
    pub invalid_logs: usize,
    /// One message per invalid entry.
    pub validation_errors: Vec<String>,
    /// Structural warnings, e.g. when the invalid fraction exceeds the
    /// configured threshold.
    pub warnings: Vec<String>,
}

impl IntegrityReport {
    /// Fraction of entries failing validation, in `[0.0, 1.0]`.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.total_logs == 0 {
            0.0
        } else {
            self.invalid_logs as f64 / self.total_logs as f64
        }
    }
}

fn describe_invalid(index: usize, entry: &LogEntry) -> String {
    if entry.parsed_timestamp().is_none() {
        if entry.timestamp.trim().is_empty() {
            format!("entry {index}: missing timestamp")
        } else {
            format!(
                "entry {index}: unparseable timestamp '{}'",
                entry.timestamp
            )
        }
    } else {
        format!("entry {index}: empty full_log")
    }
}

/// Validates every entry, collecting one error message per invalid entry.
///
/// A warning is emitted when the invalid fraction exceeds
/// `warning_threshold` (the engine default is 0.20).
#[must_use]
pub fn validate_integrity(entries: &[LogEntry], warning_threshold: f64) -> IntegrityReport {
    let mut validation_errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_valid() {
            validation_errors.push(describe_invalid(index, entry));
        }
    }

    let invalid_logs = validation_errors.len();
    let mut report = IntegrityReport {
        total_logs: entries.len(),
        valid_logs: entries.len() - invalid_logs,
        invalid_logs,
        validation_errors,
        warnings: Vec::new(),
    };

    let rate = report.error_rate();
    if rate > warning_threshold {
        let warning = format!(
            "{:.1}% of entries failed validation (threshold {:.1}%)",
            rate * 100.0,
            warning_threshold * 100.0
        );
        tracing::warn!(
            invalid = report.invalid_logs,
            total = report.total_logs,
            "Corpus integrity degraded: {warning}"
        );
        report.warnings.push(warning);
    }

    report
}

/// Classifies error rate and disk usage against the configured thresholds.
#[must_use]
pub fn classify_health(
    error_rate: f64,
    disk_usage_mb: f64,
    thresholds: &HealthThresholds,
) -> HealthState {
    if error_rate > thresholds.error_rate_critical || disk_usage_mb > thresholds.disk_critical_mb {
        HealthState::Critical
    } else if error_rate > thresholds.error_rate_warning
        || disk_usage_mb > thresholds.disk_warning_mb
    {
        HealthState::Warning
    } else {
        HealthState::Healthy
    }
}
