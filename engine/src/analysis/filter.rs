//! Filtering and free-text search over an entry collection.
//!
//! Both functions preserve the original order of the input and never
//! mutate it.

use crate::models::{LogEntry, LogFilter, SearchField};

/// Returns the subsequence of entries matching every supplied criterion.
///
/// An empty filter returns the input unchanged, in original order.
#[must_use]
pub fn apply_filter(entries: &[LogEntry], filter: &LogFilter) -> Vec<LogEntry> {
    entries
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect()
}

fn field_value<'a>(entry: &'a LogEntry, field: SearchField) -> Option<&'a str> {
    match field {
        SearchField::FullLog => Some(entry.full_log.as_str()),
        SearchField::Location => entry.location.as_deref(),
        SearchField::Level => entry.level.as_deref(),
        SearchField::AgentName => entry.agent_name(),
        SearchField::DecoderName => entry.decoder.as_ref().and_then(|d| d.name.as_deref()),
    }
}

/// Case-insensitive substring search over the named fields.
///
/// An empty query returns all entries unchanged. When `fields` is `None`
/// the scan covers `full_log` and `location`.
#[must_use]
pub fn search(entries: &[LogEntry], query: &str, fields: Option<&[SearchField]>) -> Vec<LogEntry> {
    if query.is_empty() {
        return entries.to_vec();
    }

    let default_fields = [SearchField::FullLog, SearchField::Location];
    let fields = fields.unwrap_or(&default_fields);
    let needle = query.to_lowercase();

    entries
        .iter()
        .filter(|entry| {
            fields.iter().any(|&field| {
                field_value(entry, field)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect()
}
