//! The engine façade.
//!
//! [`LogEngine`] owns the configuration, the in-memory corpus and the
//! maintenance coordination. Read paths (filter, search, stats, summary,
//! integrity, health) are synchronous and operate on an immutable corpus
//! snapshot; a reload builds a new corpus aside and swaps it in atomically,
//! so readers never observe a half-replaced corpus. At most one reload or
//! cleanup is in flight per engine.

use crate::analysis::{
    aggregate, apply_filter, classify_health, search, summarize, validate_integrity,
    IntegrityReport, LogSummary,
};
use crate::cleanup::{cleanup, tree_size_mb, CleanupReport};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::metadata::extract;
use crate::models::{
    HealthStatus, LogEntry, LogFilter, LogMetadata, LogStats, ReloadStatus, SearchField,
};
use crate::reload::{run_reload, ProgressCallback, ReloadHandle};
use crate::store::{ArchiveStore, LocalArchiveStore, RemoteArchiveStore, SshCredentials};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Releases the maintenance flag when dropped.
struct MaintenanceGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for MaintenanceGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn read_lock<T: Clone>(lock: &RwLock<T>) -> T {
    match lock.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_lock<T>(lock: &RwLock<T>, value: T) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// The log analytics engine.
///
/// # Example
///
/// ```no_run
/// use engine::{EngineConfig, LogEngine};
/// use engine::models::LogFilter;
///
/// let engine = LogEngine::new(EngineConfig::new("/var/ossec/logs/archives"));
/// let status = engine.reload_days(7, None, None).unwrap();
/// println!("{}: {}", status.state, status.message);
///
/// let warnings = engine.filter(&LogFilter::new().with_levels(["warning"]));
/// println!("{} warnings cached", warnings.len());
/// ```
pub struct LogEngine {
    config: EngineConfig,
    corpus: RwLock<Arc<Vec<LogEntry>>>,
    maintenance: Arc<AtomicBool>,
    last_status: Arc<RwLock<Option<ReloadStatus>>>,
    last_reload: RwLock<Option<DateTime<Utc>>>,
}

impl LogEngine {
    /// Creates an engine with an empty corpus.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            corpus: RwLock::new(Arc::new(Vec::new())),
            maintenance: Arc::new(AtomicBool::new(false)),
            last_status: Arc::new(RwLock::new(None)),
            last_reload: RwLock::new(None),
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns an immutable snapshot of the current corpus.
    ///
    /// The snapshot stays consistent even if a reload swaps the corpus
    /// while the caller still holds it.
    #[must_use]
    pub fn corpus(&self) -> Arc<Vec<LogEntry>> {
        read_lock(&self.corpus)
    }

    fn try_begin_maintenance(&self) -> Result<MaintenanceGuard> {
        if self
            .maintenance
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(EngineError::Busy);
        }
        Ok(MaintenanceGuard {
            flag: Arc::clone(&self.maintenance),
        })
    }

    fn store_for(&self, credentials: Option<SshCredentials>) -> Box<dyn ArchiveStore> {
        match credentials {
            Some(creds) => Box::new(RemoteArchiveStore::new(
                self.config.data_root.clone(),
                creds,
                self.config.remote_timeout,
            )),
            None => Box::new(LocalArchiveStore::new(self.config.data_root.clone())),
        }
    }

    /// Loads the most recent `days` days of entries without touching the
    /// corpus.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `days` is zero.
    pub fn load(&self, days: u32, credentials: Option<SshCredentials>) -> Result<Vec<LogEntry>> {
        let store = self.store_for(credentials);
        crate::store::load(store.as_ref(), days)
    }

    /// Reloads the corpus from the given day range `[start, end)`.
    ///
    /// An inverted or empty range yields an immediate terminal `failed`
    /// status without performing any I/O. On success the corpus is swapped
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Busy`] when another reload or cleanup is
    /// already in flight.
    pub fn reload_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        credentials: Option<SshCredentials>,
        on_progress: Option<&dyn Fn(&ReloadStatus)>,
    ) -> Result<ReloadStatus> {
        if end <= start {
            let mut status = ReloadStatus::pending();
            status.fail(format!("Invalid date range: {end} <= {start}"));
            tracing::warn!(%start, %end, "Reload rejected: inverted date range");
            write_lock(&self.last_status, Some(status.clone()));
            if let Some(cb) = on_progress {
                cb(&status);
            }
            return Ok(status);
        }

        let _guard = self.try_begin_maintenance()?;
        let store = self.store_for(credentials);
        let last_status = Arc::clone(&self.last_status);

        let mut callback = |status: &ReloadStatus| {
            write_lock(&last_status, Some(status.clone()));
            if let Some(cb) = on_progress {
                cb(status);
            }
        };

        let (status, corpus) = run_reload(store.as_ref(), start, end, &mut callback);
        if matches!(status.state, crate::models::ReloadState::Completed) {
            write_lock(&self.corpus, Arc::new(corpus));
            write_lock(&self.last_reload, Some(Utc::now()));
        }
        Ok(status)
    }

    /// Reloads the most recent `days` days, today included.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `days` is zero, or
    /// [`EngineError::Busy`] when maintenance is already in flight.
    pub fn reload_days(
        &self,
        days: u32,
        credentials: Option<SshCredentials>,
        on_progress: Option<&dyn Fn(&ReloadStatus)>,
    ) -> Result<ReloadStatus> {
        let (start, end) = Self::day_span(days)?;
        self.reload_range(start, end, credentials, on_progress)
    }

    /// Starts a reload of the most recent `days` days on a background
    /// worker and returns immediately.
    ///
    /// The worker publishes a status snapshot after each day; the last
    /// delivery before it exits is terminal. The handle is joinable with a
    /// bounded wait.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `days` is zero, or
    /// [`EngineError::Busy`] when maintenance is already in flight.
    pub fn reload_background(
        self: &Arc<Self>,
        days: u32,
        credentials: Option<SshCredentials>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<ReloadHandle> {
        let (start, end) = Self::day_span(days)?;
        // Acquire the guard before spawning so a concurrent request is
        // rejected synchronously rather than raced in the worker.
        let guard = self.try_begin_maintenance()?;

        let shared = Arc::new(RwLock::new(ReloadStatus::pending()));
        let worker_shared = Arc::clone(&shared);
        let engine = Arc::clone(self);

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let store = engine.store_for(credentials);
            let last_status = Arc::clone(&engine.last_status);

            let mut callback = |status: &ReloadStatus| {
                write_lock(&worker_shared, status.clone());
                write_lock(&last_status, Some(status.clone()));
                if let Some(cb) = &on_progress {
                    cb(status);
                }
            };

            let (status, corpus) = run_reload(store.as_ref(), start, end, &mut callback);
            if matches!(status.state, crate::models::ReloadState::Completed) {
                write_lock(&engine.corpus, Arc::new(corpus));
                write_lock(&engine.last_reload, Some(Utc::now()));
            }
            status
        });

        Ok(ReloadHandle {
            task,
            status: shared,
        })
    }

    fn day_span(days: u32) -> Result<(NaiveDate, NaiveDate)> {
        if days == 0 {
            return Err(EngineError::Validation("days must be >= 1".to_string()));
        }
        let today = Utc::now().date_naive();
        let start = today - Duration::days(i64::from(days) - 1);
        Ok((start, today + Duration::days(1)))
    }

    /// Status of the most recent reload, if any.
    #[must_use]
    pub fn reload_status(&self) -> Option<ReloadStatus> {
        read_lock(&self.last_status)
    }

    /// Removes archive partitions older than the retention horizon.
    ///
    /// Uses the configured default when `days_to_keep` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero horizon, or
    /// [`EngineError::Busy`] when a reload is in flight on the same tree.
    pub fn cleanup(&self, days_to_keep: Option<u32>) -> Result<CleanupReport> {
        let days = days_to_keep.unwrap_or(self.config.retention_days);
        if days == 0 {
            return Err(EngineError::Validation(
                "days_to_keep must be >= 1".to_string(),
            ));
        }
        let _guard = self.try_begin_maintenance()?;
        cleanup(&self.config.data_root, days)
    }

    /// Filters the cached corpus.
    #[must_use]
    pub fn filter(&self, filter: &LogFilter) -> Vec<LogEntry> {
        apply_filter(&self.corpus(), filter)
    }

    /// Searches the cached corpus. `fields = None` scans the configured
    /// default fields.
    #[must_use]
    pub fn search(&self, query: &str, fields: Option<&[SearchField]>) -> Vec<LogEntry> {
        let corpus = self.corpus();
        match fields {
            Some(fields) => search(&corpus, query, Some(fields)),
            None => search(&corpus, query, Some(&self.config.default_search_fields)),
        }
    }

    /// Aggregates statistics over the cached corpus.
    #[must_use]
    pub fn stats(&self) -> LogStats {
        aggregate(&self.corpus())
    }

    /// Produces the external-facing summary over the cached corpus.
    #[must_use]
    pub fn summary(&self) -> LogSummary {
        summarize(
            &self.corpus(),
            self.config.top_n,
            self.config.integrity_warning_threshold,
        )
    }

    /// Derives metadata for a single entry using the configured tag table.
    #[must_use]
    pub fn metadata(&self, entry: &LogEntry) -> LogMetadata {
        extract(entry, &self.config.tag_rules)
    }

    /// Derives metadata for every cached entry, in corpus order.
    #[must_use]
    pub fn metadata_all(&self) -> Vec<LogMetadata> {
        self.corpus()
            .iter()
            .map(|e| extract(e, &self.config.tag_rules))
            .collect()
    }

    /// Validates the cached corpus.
    #[must_use]
    pub fn validate_integrity(&self) -> IntegrityReport {
        validate_integrity(&self.corpus(), self.config.integrity_warning_threshold)
    }

    /// Computes a point-in-time health snapshot from the cached corpus and
    /// the on-disk archive tree.
    #[must_use]
    pub fn health(&self) -> HealthStatus {
        let corpus = self.corpus();
        let report = validate_integrity(&corpus, self.config.integrity_warning_threshold);
        let disk_usage_mb = tree_size_mb(&self.config.data_root);
        let error_rate = report.error_rate();

        // Rough corpus footprint: log content plus per-entry structure.
        let cache_size_mb = corpus
            .iter()
            .map(|e| e.full_log.len() + 512)
            .sum::<usize>() as f64
            / (1024.0 * 1024.0);

        let avg_processing_time_ms = self
            .reload_status()
            .filter(|s| s.logs_processed > 0)
            .map(|s| s.duration().num_milliseconds() as f64 / s.logs_processed as f64)
            .unwrap_or(0.0);

        HealthStatus {
            status: classify_health(error_rate, disk_usage_mb, &self.config.thresholds),
            last_reload: read_lock(&self.last_reload),
            total_logs_cached: corpus.len(),
            cache_size_mb,
            avg_processing_time_ms,
            error_rate,
            disk_usage_mb,
            memory_usage_mb: cache_size_mb,
        }
    }
}
