//! Derived per-entry metadata and the tag rule table.
//!
//! Metadata is computed once per entry (timestamp parsed, optional structure
//! flattened, heuristic tags derived) so that filtering and search do not
//! need to re-walk the nested entry shape. Tag derivation is configuration
//! data, not extractor logic: a table of (trigger substring -> tag) matched
//! against both rule group names and log content. Matches are independent
//! and cumulative.

use crate::models::LogEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single tag derivation rule: when `trigger` appears as a substring in a
/// rule group name or in the log content (case-insensitive), `tag` is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    /// Substring to look for in group names and log content.
    pub trigger: String,
    /// Tag added when the trigger matches.
    pub tag: String,
}

impl TagRule {
    /// Creates a new tag rule.
    #[must_use]
    pub fn new(trigger: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            tag: tag.into(),
        }
    }

    /// The default tag table covering authentication, network and
    /// file-system activity.
    #[must_use]
    pub fn default_rules() -> Vec<Self> {
        vec![
            Self::new("authentication", "authentication"),
            Self::new("password", "authentication"),
            Self::new("login", "authentication"),
            Self::new("sshd", "authentication"),
            Self::new("network", "network"),
            Self::new("connection", "network"),
            Self::new("port scan", "network"),
            Self::new("firewall", "network"),
            Self::new("protocol", "network"),
            Self::new("syscheck", "file_system"),
            Self::new("file added", "file_system"),
            Self::new("file modified", "file_system"),
            Self::new("file deleted", "file_system"),
            Self::new("integrity checksum", "file_system"),
        ]
    }
}

/// Denormalized metadata derived 1:1 from a [`LogEntry`].
///
/// Absent optional structure on the entry (no rule, no agent) yields absent
/// metadata fields, never defaults that look like real data. Never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMetadata {
    /// Parsed event timestamp, when the raw timestamp was parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Originating location or source path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Free-form severity label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Matched rule identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Numeric severity from the rule level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,

    /// Agent name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    /// Agent IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_ip: Option<String>,

    /// Decoder name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder_name: Option<String>,

    /// Rule groups, copied verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    /// Union of rule groups and heuristically derived tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

/// Derives metadata for a single entry using the given tag table.
///
/// Rule groups are copied into `tags` verbatim; each [`TagRule`] whose
/// trigger appears in a group name or the log content adds its tag on top.
///
/// # Example
///
/// ```
/// use engine::models::{LogEntry, TagRule};
/// use engine::models::metadata::extract;
///
/// let entry: LogEntry = serde_json::from_str(r#"{
///     "timestamp": "2024-01-15T10:30:00Z",
///     "full_log": "Failed password for root from 10.0.0.9"
/// }"#).unwrap();
///
/// let meta = extract(&entry, &TagRule::default_rules());
/// assert!(meta.tags.contains("authentication"));
/// ```
#[must_use]
pub fn extract(entry: &LogEntry, tag_rules: &[TagRule]) -> LogMetadata {
    let rule = entry.rule.as_ref();
    let groups: Vec<String> = rule.map(|r| r.groups.clone()).unwrap_or_default();

    let mut tags: BTreeSet<String> = groups.iter().cloned().collect();

    let content = entry.full_log.to_lowercase();
    let lowered_groups: Vec<String> = groups.iter().map(|g| g.to_lowercase()).collect();
    for rule in tag_rules {
        let trigger = rule.trigger.to_lowercase();
        let in_groups = lowered_groups.iter().any(|g| g.contains(&trigger));
        if in_groups || content.contains(&trigger) {
            tags.insert(rule.tag.clone());
        }
    }

    LogMetadata {
        timestamp: entry.parsed_timestamp(),
        source: entry.location.clone(),
        level: entry.level.clone(),
        rule_id: rule.and_then(|r| r.id.clone()),
        severity: rule.and_then(|r| r.level),
        agent_name: entry.agent.as_ref().and_then(|a| a.name.clone()),
        agent_ip: entry.agent.as_ref().and_then(|a| a.ip.clone()),
        decoder_name: entry.decoder.as_ref().and_then(|d| d.name.clone()),
        groups,
        tags,
    }
}
