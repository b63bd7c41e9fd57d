//! Log entry data model.
//!
//! Defines the core `LogEntry` structure for Wazuh-style security event
//! records, along with its nested rule, agent and decoder structures.
//! An entry is created by an archive store from raw bytes, cleaned once,
//! and read-only thereafter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rule metadata attached to a log entry by the originating SIEM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rule {
    /// Rule identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Numeric rule level (severity).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Human-readable rule description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Group tags assigned to the rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl Rule {
    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.level.is_none()
            && self.description.is_none()
            && self.groups.is_empty()
    }
}

/// The agent that produced a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Agent {
    /// Agent name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Agent IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl Agent {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.ip.is_none()
    }
}

/// The decoder that parsed the raw event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Decoder {
    /// Decoder name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Decoder {
    fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// A single security log record.
///
/// A *valid* entry has a parseable ISO-8601 timestamp and a non-empty
/// `full_log`; entries failing this are reported by integrity checks,
/// never silently kept.
///
/// # Example
///
/// ```
/// use engine::models::LogEntry;
///
/// let entry: LogEntry = serde_json::from_str(r#"{
///     "timestamp": "2024-01-15T10:30:00+0000",
///     "full_log": "sshd[1234]: Failed password for root",
///     "level": "warning",
///     "location": "/var/log/auth.log"
/// }"#).unwrap();
///
/// assert!(entry.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LogEntry {
    /// Event timestamp as an ISO-8601 string.
    #[serde(default)]
    pub timestamp: String,

    /// Raw log line as received from the source.
    #[serde(default)]
    pub full_log: String,

    /// Free-form severity label (e.g. "info", "warning", "error").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Originating location or source path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Rule metadata, when a rule matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,

    /// Originating agent, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,

    /// Decoder that parsed the event, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder: Option<Decoder>,
}

/// Trims a string field, dropping it entirely when empty.
fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LogEntry {
    /// Parses the entry's timestamp into an instant.
    ///
    /// Accepts RFC 3339 as well as the compact Wazuh offset form
    /// (`2024-01-15T10:30:00.123+0000`). Returns `None` when the
    /// timestamp is absent or unparseable.
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp.trim();
        if ts.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(ts)
            .or_else(|_| DateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Returns true iff the timestamp is parseable and `full_log` is
    /// non-empty after trimming.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.parsed_timestamp().is_some() && !self.full_log.trim().is_empty()
    }

    /// Returns a cleaned copy of the entry.
    ///
    /// Leading/trailing whitespace is stripped from all text fields, and
    /// any optional field whose value is empty is removed entirely rather
    /// than kept as an empty placeholder. Cleaning never fails and is
    /// idempotent: `clean(clean(e)) == clean(e)`.
    #[must_use]
    pub fn clean(&self) -> Self {
        let rule = self.rule.clone().map(|r| Rule {
            id: clean_opt(r.id),
            level: r.level,
            description: clean_opt(r.description),
            groups: r
                .groups
                .into_iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
        });
        let agent = self.agent.clone().map(|a| Agent {
            name: clean_opt(a.name),
            ip: clean_opt(a.ip),
        });
        let decoder = self.decoder.clone().map(|d| Decoder {
            name: clean_opt(d.name),
        });

        Self {
            timestamp: self.timestamp.trim().to_string(),
            full_log: self.full_log.trim().to_string(),
            level: clean_opt(self.level.clone()),
            location: clean_opt(self.location.clone()),
            rule: rule.filter(|r| !r.is_empty()),
            agent: agent.filter(|a| !a.is_empty()),
            decoder: decoder.filter(|d| !d.is_empty()),
        }
    }

    /// Returns the numeric rule level, when the entry carries one.
    #[must_use]
    pub fn rule_level(&self) -> Option<u8> {
        self.rule.as_ref().and_then(|r| r.level)
    }

    /// Returns the agent name, when the entry carries one.
    #[must_use]
    pub fn agent_name(&self) -> Option<&str> {
        self.agent.as_ref().and_then(|a| a.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> LogEntry {
        serde_json::from_str(
            r#"{
                "timestamp": "2024-01-15T10:30:00.123+0000",
                "full_log": "  sshd[1234]: Failed password for root  ",
                "level": "warning",
                "location": "/var/log/auth.log",
                "rule": {
                    "id": "5710",
                    "level": 5,
                    "description": "sshd: Attempt to login using a non-existent user",
                    "groups": ["syslog", "sshd", "authentication_failed"]
                },
                "agent": {"name": "web-01", "ip": "10.0.0.5"},
                "decoder": {"name": "sshd"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parsed_timestamp_wazuh_offset() {
        let entry = sample_entry();
        let ts = entry.parsed_timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T10:30:00.123+00:00");
    }

    #[test]
    fn test_parsed_timestamp_rfc3339() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00Z".to_string(),
            full_log: "event".to_string(),
            ..Default::default()
        };
        assert!(entry.parsed_timestamp().is_some());
    }

    #[test]
    fn test_parsed_timestamp_garbage() {
        let entry = LogEntry {
            timestamp: "yesterday at noon".to_string(),
            ..Default::default()
        };
        assert!(entry.parsed_timestamp().is_none());
    }

    #[test]
    fn test_is_valid() {
        assert!(sample_entry().is_valid());
    }

    #[test]
    fn test_is_valid_rejects_empty_full_log() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00Z".to_string(),
            full_log: "   ".to_string(),
            ..Default::default()
        };
        assert!(!entry.is_valid());
    }

    #[test]
    fn test_is_valid_rejects_missing_timestamp() {
        let entry = LogEntry {
            full_log: "event".to_string(),
            ..Default::default()
        };
        assert!(!entry.is_valid());
    }

    #[test]
    fn test_clean_trims_text_fields() {
        let cleaned = sample_entry().clean();
        assert_eq!(cleaned.full_log, "sshd[1234]: Failed password for root");
    }

    #[test]
    fn test_clean_drops_empty_fields() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00Z".to_string(),
            full_log: "event".to_string(),
            level: Some("  ".to_string()),
            location: Some(String::new()),
            agent: Some(Agent {
                name: Some(String::new()),
                ip: None,
            }),
            decoder: Some(Decoder { name: None }),
            ..Default::default()
        };
        let cleaned = entry.clean();
        assert!(cleaned.level.is_none());
        assert!(cleaned.location.is_none());
        assert!(cleaned.agent.is_none());
        assert!(cleaned.decoder.is_none());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let entry = sample_entry();
        let once = entry.clean();
        let twice = once.clean();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_keeps_populated_rule() {
        let cleaned = sample_entry().clean();
        let rule = cleaned.rule.unwrap();
        assert_eq!(rule.id.as_deref(), Some("5710"));
        assert_eq!(rule.level, Some(5));
        assert_eq!(rule.groups.len(), 3);
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00Z".to_string(),
            full_log: "event".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("rule"));
        assert!(!json.contains("agent"));
        assert!(!json.contains("decoder"));
    }

    #[test]
    fn test_deserialization_tolerates_missing_fields() {
        let entry: LogEntry = serde_json::from_str(r#"{"full_log": "bare event"}"#).unwrap();
        assert_eq!(entry.full_log, "bare event");
        assert!(entry.timestamp.is_empty());
        assert!(!entry.is_valid());
    }
}
