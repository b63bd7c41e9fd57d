//! Reload orchestration primitives.
//!
//! A reload walks a day range oldest-first, loading each day's partition
//! through an [`ArchiveStore`], and publishes a [`ReloadStatus`] snapshot
//! after every day. Progress is monotonically non-decreasing within one
//! reload, and the last status delivered before the worker exits is always
//! terminal.

use crate::error::{EngineError, Result};
use crate::models::{LogEntry, ReloadStatus};
use crate::store::ArchiveStore;
use chrono::{Duration, NaiveDate};
use std::sync::{Arc, RwLock};

/// Callback invoked with a status snapshot after each processed day.
///
/// Callbacks run on the reload worker and receive a clone of the status;
/// they cannot hold any engine lock.
pub type ProgressCallback = Arc<dyn Fn(&ReloadStatus) + Send + Sync>;

/// Handle to a background reload worker.
///
/// The handle is joinable with a bounded wait; a caller that gives up
/// waiting can still observe the terminal status later through
/// [`ReloadHandle::status`] or the engine's last-status accessor.
pub struct ReloadHandle {
    pub(crate) task: tokio::task::JoinHandle<ReloadStatus>,
    pub(crate) status: Arc<RwLock<ReloadStatus>>,
}

impl ReloadHandle {
    /// Snapshot of the most recently published status.
    #[must_use]
    pub fn status(&self) -> ReloadStatus {
        match self.status.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True once the worker has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the worker and returns its terminal status.
    ///
    /// # Errors
    ///
    /// Returns a processing error if the worker panicked.
    pub async fn join(self) -> Result<ReloadStatus> {
        self.task
            .await
            .map_err(|e| EngineError::Processing(format!("Reload worker panicked: {e}")))
    }

    /// Waits for the worker with a bounded timeout.
    ///
    /// On timeout the worker keeps running detached; its terminal status
    /// remains observable through the engine.
    ///
    /// # Errors
    ///
    /// Returns a processing error on timeout or worker panic.
    pub async fn join_timeout(self, timeout: std::time::Duration) -> Result<ReloadStatus> {
        match tokio::time::timeout(timeout, self.task).await {
            Ok(result) => {
                result.map_err(|e| EngineError::Processing(format!("Reload worker panicked: {e}")))
            }
            Err(_) => Err(EngineError::Processing(
                "Timed out waiting for reload worker".to_string(),
            )),
        }
    }
}

/// Runs one reload over `[start, end)`, invoking `on_progress` after each
/// day and once more with the terminal status.
///
/// The caller guarantees `start < end` and holds the maintenance guard.
/// Returns the terminal status and the loaded corpus; the corpus is only
/// meaningful when the status completed.
pub(crate) fn run_reload(
    store: &dyn ArchiveStore,
    start: NaiveDate,
    end: NaiveDate,
    on_progress: &mut dyn FnMut(&ReloadStatus),
) -> (ReloadStatus, Vec<LogEntry>) {
    let total_days = (end - start).num_days();
    let mut status = ReloadStatus::running(format!("Loading {total_days} day(s) of archives"));
    tracing::info!(%start, %end, total_days, "Reload started");
    on_progress(&status);

    let mut corpus = Vec::new();
    let mut failed_days: Vec<NaiveDate> = Vec::new();
    let mut date = start;
    let mut done = 0i64;

    while date < end {
        match store.load_day(date) {
            Ok(entries) => corpus.extend(entries),
            Err(e) => {
                failed_days.push(date);
                tracing::warn!(%date, error = %e, "Day failed during reload, skipping");
            }
        }
        done += 1;
        status.logs_processed = corpus.len();
        status.total_logs = corpus.len();
        status.progress = done as f64 / total_days as f64;
        status.message = format!("Processed {done}/{total_days} day(s)");
        on_progress(&status);
        date += Duration::days(1);
    }

    if !failed_days.is_empty() && failed_days.len() as i64 == total_days {
        status.fail(format!("All {total_days} day(s) failed to load"));
        tracing::error!(total_days, "Reload failed: no day could be loaded");
    } else if failed_days.is_empty() {
        status.complete(format!(
            "Loaded {} entries from {total_days} day(s)",
            corpus.len()
        ));
        tracing::info!(entries = corpus.len(), "Reload completed");
    } else {
        status.complete(format!(
            "Loaded {} entries from {total_days} day(s); {} day(s) skipped",
            corpus.len(),
            failed_days.len()
        ));
        tracing::warn!(
            entries = corpus.len(),
            skipped = failed_days.len(),
            "Reload completed with skipped days"
        );
    }
    on_progress(&status);

    (status, corpus)
}
