//! Data models for the log analytics engine.
//!
//! - [`entry`] - the raw log entry and its nested rule/agent/decoder structures
//! - [`metadata`] - derived per-entry metadata and the tag rule table
//! - [`filter`] - multi-criteria filter value object
//! - [`stats`] - aggregate statistics snapshot
//! - [`status`] - reload progress and health status types

pub mod entry;
pub mod filter;
pub mod metadata;
pub mod stats;
pub mod status;

pub use entry::{Agent, Decoder, LogEntry, Rule};
pub use filter::{LogFilter, SearchField};
pub use metadata::{LogMetadata, TagRule};
pub use stats::LogStats;
pub use status::{HealthState, HealthStatus, ReloadState, ReloadStatus};
