//! Aggregate statistics snapshot.
//!
//! `LogStats` is a pure function of the entry collection it was computed
//! from; it is recomputed fresh on each call, never incrementally
//! maintained. Ordered maps keep the serialized shape stable across calls
//! for the same input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and distributions over a collection of log entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    /// Total number of entries in the collection.
    pub total_logs: usize,

    /// Count per source/location.
    pub sources: BTreeMap<String, u64>,

    /// Count per severity label.
    pub levels: BTreeMap<String, u64>,

    /// Count per agent name.
    pub agents: BTreeMap<String, u64>,

    /// Count per rule id.
    pub rules: BTreeMap<String, u64>,

    /// Count per decoder name.
    pub decoders: BTreeMap<String, u64>,

    /// Count per numeric rule level.
    pub severity_distribution: BTreeMap<u8, u64>,

    /// Count per hour of day (0-23), from parseable timestamps only.
    pub hourly_distribution: [u64; 24],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let stats = LogStats::default();
        assert_eq!(stats.total_logs, 0);
        assert!(stats.sources.is_empty());
        assert_eq!(stats.hourly_distribution, [0u64; 24]);
    }

    #[test]
    fn test_serialized_shape_is_stable() {
        let mut stats = LogStats::default();
        stats.levels.insert("warning".to_string(), 2);
        stats.levels.insert("error".to_string(), 1);
        stats.severity_distribution.insert(5, 3);

        let a = serde_json::to_string(&stats).unwrap();
        let b = serde_json::to_string(&stats.clone()).unwrap();
        assert_eq!(a, b);
        // BTreeMap keys serialize in sorted order.
        assert!(a.find("\"error\"").unwrap() < a.find("\"warning\"").unwrap());
    }
}
