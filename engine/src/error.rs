//! Engine error taxonomy.
//!
//! Errors fall into four families: bad caller input (`Validation`), remote
//! transport failures (`Transport`), local I/O failures (`Io`) and unexpected
//! structural failures while parsing or aggregating (`Processing`). A fifth
//! variant, `Busy`, signals that a conflicting maintenance operation (reload
//! or cleanup) already owns the data root.

use thiserror::Error;

/// Errors produced by the log analytics engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad caller input: non-positive day counts, inverted date ranges,
    /// non-positive retention horizons. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote archive access failure (connection, authentication, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local filesystem access failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected structural failure while parsing or aggregating.
    #[error("Processing error: {0}")]
    Processing(String),

    /// A reload or cleanup is already in flight for this data root.
    #[error("Another maintenance operation is already in flight")]
    Busy,
}

/// Convenience result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
