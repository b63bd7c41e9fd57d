//! Archive store trait and implementations.
//!
//! An archive store reads raw log records from a date-partitioned tree of
//! JSON-lines files (`<root>/<YYYY>/<Mon>/ossec-archive-<DD>.json`), either
//! on the local filesystem or fetched from a remote host over SFTP.
//!
//! Malformed lines are skipped, not fatal; missing partitions yield an
//! empty result, not a failure of the whole load.

mod local;
mod remote;

pub use local::LocalArchiveStore;
pub use remote::RemoteArchiveStore;

use crate::error::{EngineError, Result};
use crate::models::LogEntry;
use chrono::{Duration, NaiveDate, Utc};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Connection parameters for the remote archive transport.
///
/// Held only for the duration of a fetch; never persisted by the engine.
/// Either `password` or `key_path` must be set.
#[derive(Clone)]
pub struct SshCredentials {
    /// Remote username.
    pub username: String,
    /// Remote host name or address.
    pub host: String,
    /// Remote SSH port.
    pub port: u16,
    /// Password, for password authentication.
    pub password: Option<String>,
    /// Path to a private key file, for key authentication.
    pub key_path: Option<PathBuf>,
}

impl SshCredentials {
    /// Creates password-based credentials.
    #[must_use]
    pub fn with_password(
        username: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            host: host.into(),
            port,
            password: Some(password.into()),
            key_path: None,
        }
    }

    /// Creates key-based credentials.
    #[must_use]
    pub fn with_key(
        username: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            username: username.into(),
            host: host.into(),
            port,
            password: None,
            key_path: Some(key_path.into()),
        }
    }
}

// Manual Debug so the password never reaches logs.
impl std::fmt::Debug for SshCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshCredentials")
            .field("username", &self.username)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_path", &self.key_path)
            .finish()
    }
}

/// Trait for reading one day's worth of archived log entries.
///
/// Implementations must be thread-safe (Send + Sync) and must tolerate
/// missing partitions (returning an empty vector) and malformed lines
/// (skipping them).
pub trait ArchiveStore: Send + Sync {
    /// Loads all entries for the given day.
    ///
    /// # Errors
    ///
    /// Returns an error only when the partition exists but cannot be read
    /// (I/O or transport failure). A missing partition is `Ok(vec![])`.
    fn load_day(&self, date: NaiveDate) -> Result<Vec<LogEntry>>;
}

/// Relative path of the archive file for a given day, e.g.
/// `2024/Jan/ossec-archive-05.json`.
#[must_use]
pub fn archive_rel_path(date: NaiveDate) -> PathBuf {
    PathBuf::from(date.format("%Y/%b").to_string())
        .join(format!("ossec-archive-{}.json", date.format("%d")))
}

/// Parses one JSON-lines archive stream into cleaned entries.
///
/// Returns the entries and the number of malformed lines skipped. A bad
/// line never aborts the remainder of the stream.
pub(crate) fn parse_archive<R: BufRead>(reader: R, origin: &Path) -> (Vec<LogEntry>, usize) {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(file = %origin.display(), line = line_no + 1, error = %e,
                    "Unreadable line in archive, skipping rest of file");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry.clean()),
            Err(e) => {
                skipped += 1;
                tracing::warn!(file = %origin.display(), line = line_no + 1, error = %e,
                    "Malformed archive line skipped");
            }
        }
    }

    (entries, skipped)
}

/// Loads the most recent `days` days of entries from the store.
///
/// Days are processed oldest first, today included. A day that fails to
/// load is recorded and skipped; it contributes zero entries but does not
/// abort the load.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when `days` is zero.
pub fn load(store: &dyn ArchiveStore, days: u32) -> Result<Vec<LogEntry>> {
    if days == 0 {
        return Err(EngineError::Validation(
            "days must be >= 1".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let start = today - Duration::days(i64::from(days) - 1);
    let mut entries = Vec::new();
    let mut failed_days = 0usize;

    let mut date = start;
    while date <= today {
        match store.load_day(date) {
            Ok(day_entries) => entries.extend(day_entries),
            Err(e) => {
                failed_days += 1;
                tracing::warn!(%date, error = %e, "Failed to load archive day, skipping");
            }
        }
        date += Duration::days(1);
    }

    tracing::info!(
        days,
        failed_days,
        loaded = entries.len(),
        "Archive load finished"
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_archive_rel_path() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            archive_rel_path(date),
            PathBuf::from("2024/Jan/ossec-archive-05.json")
        );
    }

    #[test]
    fn test_parse_archive_skips_malformed_lines() {
        let data = concat!(
            r#"{"timestamp": "2024-01-15T10:30:00Z", "full_log": "first"}"#,
            "\n",
            "{ this is not json }\n",
            "\n",
            r#"{"timestamp": "2024-01-15T10:31:00Z", "full_log": "second"}"#,
            "\n",
        );
        let (entries, skipped) = parse_archive(Cursor::new(data), Path::new("test.json"));
        assert_eq!(entries.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(entries[0].full_log, "first");
        assert_eq!(entries[1].full_log, "second");
    }

    #[test]
    fn test_parse_archive_cleans_entries() {
        let data = r#"{"timestamp": " 2024-01-15T10:30:00Z ", "full_log": "  padded  ", "level": ""}"#;
        let (entries, _) = parse_archive(Cursor::new(data), Path::new("test.json"));
        assert_eq!(entries[0].full_log, "padded");
        assert!(entries[0].level.is_none());
    }

    struct FailingStore;

    impl ArchiveStore for FailingStore {
        fn load_day(&self, _date: NaiveDate) -> Result<Vec<LogEntry>> {
            Err(EngineError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_load_rejects_zero_days() {
        let err = load(&FailingStore, 0).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_load_tolerates_failing_days() {
        // Every day fails, but the load itself succeeds with zero entries.
        let entries = load(&FailingStore, 3).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = SshCredentials::with_password("ossec", "siem.example", 22, "hunter2");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
