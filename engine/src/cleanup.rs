//! Retention-based cleanup of the on-disk archive tree.
//!
//! Walks the date-partitioned tree (`<root>/<YYYY>/<Mon>/ossec-archive-<DD>.json`)
//! and removes partitions strictly older than the retention horizon.
//! Cleanup is best-effort: per-file removal failures are captured and
//! reported, never abort the walk. Files and directories whose names do not
//! encode a date are left alone.

use crate::error::{EngineError, Result};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Number of archive files removed.
    pub files_removed: u64,
    /// Disk space reclaimed, in megabytes.
    pub space_freed_mb: f64,
    /// Per-file failure descriptions.
    pub errors: Vec<String>,
}

/// Extracts the day number from `ossec-archive-NN.json`.
fn archive_day(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("ossec-archive-")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn partition_date(year: &str, month: &str, day: u32) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{year}-{month}-{day:02}"), "%Y-%b-%d").ok()
}

/// Removes archive partitions older than `days_to_keep` days.
///
/// A partition is eligible iff its encoded date is strictly older than
/// `now - days_to_keep`. Emptied month and year directories are removed
/// opportunistically.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when `days_to_keep` is zero, and an
/// I/O error when the root itself cannot be listed. Individual removal
/// failures land in the report, not in the error channel.
pub fn cleanup(root: &Path, days_to_keep: u32) -> Result<CleanupReport> {
    if days_to_keep == 0 {
        return Err(EngineError::Validation(
            "days_to_keep must be >= 1".to_string(),
        ));
    }

    let cutoff = Utc::now().date_naive() - Duration::days(i64::from(days_to_keep));
    let mut report = CleanupReport::default();

    if !root.exists() {
        tracing::debug!(root = %root.display(), "Archive root does not exist, nothing to clean");
        return Ok(report);
    }

    for year_dir in fs::read_dir(root)?.filter_map(std::result::Result::ok) {
        let year_path = year_dir.path();
        let Some(year) = year_dir.file_name().to_str().map(String::from) else {
            continue;
        };
        if !year_path.is_dir() || year.parse::<i32>().is_err() {
            continue;
        }

        let Ok(months) = fs::read_dir(&year_path) else {
            report
                .errors
                .push(format!("cannot list {}", year_path.display()));
            continue;
        };

        for month_dir in months.filter_map(std::result::Result::ok) {
            let month_path = month_dir.path();
            let Some(month) = month_dir.file_name().to_str().map(String::from) else {
                continue;
            };
            if !month_path.is_dir() {
                continue;
            }

            let Ok(files) = fs::read_dir(&month_path) else {
                report
                    .errors
                    .push(format!("cannot list {}", month_path.display()));
                continue;
            };

            for file in files.filter_map(std::result::Result::ok) {
                let path = file.path();
                let Some(day) = file.file_name().to_str().and_then(archive_day) else {
                    continue;
                };
                let Some(date) = partition_date(&year, &month, day) else {
                    continue;
                };
                if date >= cutoff {
                    continue;
                }

                let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                match fs::remove_file(&path) {
                    Ok(()) => {
                        report.files_removed += 1;
                        report.space_freed_mb += size as f64 / (1024.0 * 1024.0);
                        tracing::debug!(file = %path.display(), %date, "Removed expired partition");
                    }
                    Err(e) => {
                        report
                            .errors
                            .push(format!("remove {}: {e}", path.display()));
                    }
                }
            }

            // Best-effort removal of emptied directories; failures are fine.
            let _ = fs::remove_dir(&month_path);
        }
        let _ = fs::remove_dir(&year_path);
    }

    tracing::info!(
        files_removed = report.files_removed,
        space_freed_mb = report.space_freed_mb,
        errors = report.errors.len(),
        "Retention cleanup finished"
    );
    Ok(report)
}

/// Total size in megabytes of all files under the given tree.
#[must_use]
pub fn tree_size_mb(root: &Path) -> f64 {
    fn walk(dir: &Path) -> u64 {
        let Ok(entries) = fs::read_dir(dir) else {
            return 0;
        };
        entries
            .filter_map(std::result::Result::ok)
            .map(|e| {
                let path = e.path();
                if path.is_dir() {
                    walk(&path)
                } else {
                    fs::metadata(&path).map(|m| m.len()).unwrap_or(0)
                }
            })
            .sum()
    }
    walk(root) as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_partition(root: &Path, date: NaiveDate) -> std::path::PathBuf {
        let dir = root.join(date.format("%Y/%b").to_string());
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("ossec-archive-{}.json", date.format("%d")));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"timestamp": "2024-01-15T10:30:00Z", "full_log": "event"}}"#
        )
        .unwrap();
        path
    }

    #[test]
    fn test_cleanup_rejects_zero_days() {
        let dir = tempfile::tempdir().unwrap();
        let err = cleanup(dir.path(), 0).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_cleanup_zero_days_removes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let old = Utc::now().date_naive() - Duration::days(400);
        let path = write_partition(dir.path(), old);
        assert!(cleanup(dir.path(), 0).is_err());
        assert!(path.exists());
    }

    #[test]
    fn test_cleanup_removes_only_expired_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let today = Utc::now().date_naive();
        let last_year = today - Duration::days(365);
        let recent = today - Duration::days(3);

        let old_path = write_partition(dir.path(), last_year);
        let recent_path = write_partition(dir.path(), recent);

        let report = cleanup(dir.path(), 30).unwrap();
        assert!(report.files_removed >= 1);
        assert!(!old_path.exists());
        assert!(recent_path.exists());
        assert!(report.errors.is_empty());
        assert!(report.space_freed_mb > 0.0);
    }

    #[test]
    fn test_cleanup_boundary_is_strictly_older() {
        let dir = tempfile::tempdir().unwrap();
        let at_horizon = Utc::now().date_naive() - Duration::days(30);
        let path = write_partition(dir.path(), at_horizon);

        // Exactly at the horizon: not strictly older, must be kept.
        let report = cleanup(dir.path(), 30).unwrap();
        assert_eq!(report.files_removed, 0);
        assert!(path.exists());
    }

    #[test]
    fn test_cleanup_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = Utc::now().date_naive() - Duration::days(365);
        let month_dir = dir.path().join(old.format("%Y/%b").to_string());
        fs::create_dir_all(&month_dir).unwrap();
        let foreign = month_dir.join("README.txt");
        fs::write(&foreign, "keep me").unwrap();

        let report = cleanup(dir.path(), 30).unwrap();
        assert_eq!(report.files_removed, 0);
        assert!(foreign.exists());
    }

    #[test]
    fn test_cleanup_missing_root_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created");
        let report = cleanup(&missing, 30).unwrap();
        assert_eq!(report.files_removed, 0);
    }

    #[test]
    fn test_cleanup_removes_emptied_directories() {
        let dir = tempfile::tempdir().unwrap();
        let old = Utc::now().date_naive() - Duration::days(365);
        write_partition(dir.path(), old);

        cleanup(dir.path(), 30).unwrap();
        let year_dir = dir.path().join(old.format("%Y").to_string());
        assert!(!year_dir.exists());
    }

    #[test]
    fn test_tree_size_mb() {
        let dir = tempfile::tempdir().unwrap();
        assert!((tree_size_mb(dir.path()) - 0.0).abs() < f64::EPSILON);
        let date = Utc::now().date_naive();
        write_partition(dir.path(), date);
        assert!(tree_size_mb(dir.path()) > 0.0);
    }
}
