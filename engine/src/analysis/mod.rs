//! Pure analysis functions over an explicit entry collection.
//!
//! Everything in this module takes the corpus as an argument and returns a
//! fresh value; nothing reads hidden state or mutates its input.
//!
//! - [`stats`] - aggregation and summaries
//! - [`filter`] - multi-criteria filtering and free-text search
//! - [`integrity`] - validation reports and health classification

pub mod filter;
pub mod integrity;
pub mod stats;

pub use filter::{apply_filter, search};
pub use integrity::{classify_health, validate_integrity, IntegrityReport};
pub use stats::{aggregate, summarize, CountedItem, LogSummary};
