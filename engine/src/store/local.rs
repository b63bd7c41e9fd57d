//! Local filesystem archive store.

use super::{archive_rel_path, parse_archive, ArchiveStore};
use crate::error::Result;
use crate::models::LogEntry;
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Reads date-partitioned JSON-lines archives from a local directory tree.
///
/// # Example
///
/// ```no_run
/// use engine::store::{ArchiveStore, LocalArchiveStore};
/// use chrono::NaiveDate;
///
/// let store = LocalArchiveStore::new("/var/ossec/logs/archives");
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let entries = store.load_day(date).unwrap();
/// println!("{} entries", entries.len());
/// ```
#[derive(Debug, Clone)]
pub struct LocalArchiveStore {
    root: PathBuf,
}

impl LocalArchiveStore {
    /// Creates a store rooted at the given archive tree.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root of the archive tree.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ArchiveStore for LocalArchiveStore {
    fn load_day(&self, date: NaiveDate) -> Result<Vec<LogEntry>> {
        let path = self.root.join(archive_rel_path(date));
        if !path.exists() {
            tracing::debug!(file = %path.display(), "No archive partition for day");
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let (entries, skipped) = parse_archive(BufReader::new(file), &path);
        if skipped > 0 {
            tracing::warn!(file = %path.display(), skipped, "Archive contained malformed lines");
        }
        Ok(entries)
    }
}
