//! Munin Log Analytics Engine
//!
//! This crate turns raw, possibly malformed, possibly remote streams of
//! Wazuh-style security event logs into validated entries, derived
//! per-record metadata, aggregate statistics, filtered/searchable views,
//! and health/integrity reports over a continuously refreshed in-memory
//! corpus.
//!
//! # Modules
//!
//! - [`models`] - entry, metadata, filter, statistics and status types
//! - [`store`] - local and remote (SFTP) archive stores
//! - [`analysis`] - pure filtering, aggregation and integrity functions
//! - [`reload`] - reload orchestration and background workers
//! - [`cleanup`] - retention-based archive tree cleanup
//!
//! # Example
//!
//! ```no_run
//! use engine::{EngineConfig, LogEngine};
//!
//! let engine = LogEngine::new(EngineConfig::new("/var/ossec/logs/archives"));
//! let status = engine.reload_days(7, None, None)?;
//! println!("reload {}: {} entries", status.state, status.logs_processed);
//!
//! let summary = engine.summary();
//! println!("{} agents seen", summary.overview.distinct_agents);
//! # Ok::<(), engine::EngineError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod cleanup;
pub mod config;
mod engine;
pub mod error;
pub mod models;
pub mod reload;
pub mod store;

pub use config::{EngineConfig, HealthThresholds};
pub use engine::LogEngine;
pub use error::{EngineError, Result};

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
