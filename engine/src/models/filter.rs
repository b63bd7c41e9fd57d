//! Multi-criteria log filter value object.
//!
//! All provided criteria combine with AND semantics; an unset criterion
//! imposes no constraint.

use crate::models::LogEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named entry field that free-text search can scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// The raw log line.
    FullLog,
    /// The originating location/source path.
    Location,
    /// The severity label.
    Level,
    /// The agent name.
    AgentName,
    /// The decoder name.
    DecoderName,
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_log" => Ok(Self::FullLog),
            "location" => Ok(Self::Location),
            "level" => Ok(Self::Level),
            "agent_name" => Ok(Self::AgentName),
            "decoder_name" => Ok(Self::DecoderName),
            other => Err(format!("Unknown search field: {other}")),
        }
    }
}

/// Filter criteria for selecting log entries.
///
/// # Example
///
/// ```
/// use engine::models::LogFilter;
///
/// let filter = LogFilter::new()
///     .with_levels(["warning", "error"])
///     .with_severity_min(5);
///
/// assert!(filter.levels.is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFilter {
    /// Match entries whose severity label is one of these (case-insensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<String>>,

    /// Match entries produced by one of these agents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<String>>,

    /// Match entries whose numeric rule level is at least this value.
    /// Entries without a rule level never match a non-trivial floor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_min: Option<u8>,

    /// Case-insensitive substring match against the log content or location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,

    /// Match entries at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Match entries strictly before this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl LogFilter {
    /// Creates an empty filter (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the severity label criterion.
    #[must_use]
    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the agent name criterion.
    #[must_use]
    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the numeric severity floor.
    #[must_use]
    pub fn with_severity_min(mut self, min: u8) -> Self {
        self.severity_min = Some(min);
        self
    }

    /// Sets the free-text criterion.
    #[must_use]
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Sets the start-of-range criterion (inclusive).
    #[must_use]
    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Sets the end-of-range criterion (exclusive).
    #[must_use]
    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Returns true iff every supplied criterion holds for the entry.
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(ref levels) = self.levels {
            let Some(ref level) = entry.level else {
                return false;
            };
            if !levels.iter().any(|l| l.eq_ignore_ascii_case(level)) {
                return false;
            }
        }

        if let Some(ref agents) = self.agents {
            let Some(name) = entry.agent_name() else {
                return false;
            };
            if !agents.iter().any(|a| a == name) {
                return false;
            }
        }

        if let Some(min) = self.severity_min {
            match entry.rule_level() {
                Some(level) if level >= min => {}
                _ => return false,
            }
        }

        if let Some(ref text) = self.search_text {
            let needle = text.to_lowercase();
            let in_log = entry.full_log.to_lowercase().contains(&needle);
            let in_location = entry
                .location
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(&needle));
            if !in_log && !in_location {
                return false;
            }
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(ts) = entry.parsed_timestamp() else {
                return false;
            };
            if let Some(start) = self.start_date {
                if ts < start {
                    return false;
                }
            }
            if let Some(end) = self.end_date {
                if ts >= end {
                    return false;
                }
            }
        }

        true
    }
}
