//! Statistics aggregation and summaries.
//!
//! [`aggregate`] folds a collection of entries into counts and
//! distributions in a single O(n) pass. [`summarize`] composes it with an
//! overview, top-N rankings and an integrity-derived health section; the
//! summary is the engine's single external-facing reporting contract and
//! its shape is stable across calls for the same input.

use crate::analysis::integrity::validate_integrity;
use crate::models::{LogEntry, LogStats};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// A named item with an occurrence count, used for top-N rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedItem {
    /// Agent name or rule id.
    pub name: String,
    /// Number of entries it appeared in.
    pub count: u64,
}

/// Overview section of a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    /// Total entries summarized.
    pub total_logs: usize,
    /// Number of distinct agents seen.
    pub distinct_agents: usize,
    /// Number of distinct rule ids seen.
    pub distinct_rules: usize,
}

/// Health section of a summary, derived from an integrity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryHealth {
    /// Fraction of entries failing validation.
    pub error_rate: f64,
    /// Entries passing validation.
    pub valid_logs: usize,
    /// Entries failing validation.
    pub invalid_logs: usize,
    /// Warnings emitted by the integrity check.
    pub warnings: Vec<String>,
}

/// Human-readable summary over an entry collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSummary {
    /// Totals and distinct counts.
    pub overview: Overview,
    /// Most frequent agents, ties broken by first-seen order.
    pub top_agents: Vec<CountedItem>,
    /// Most frequent rules, ties broken by first-seen order.
    pub top_rules: Vec<CountedItem>,
    /// Count per severity label.
    pub levels: BTreeMap<String, u64>,
    /// Count per numeric rule level.
    pub severity_distribution: BTreeMap<u8, u64>,
    /// Count per hour of day.
    pub hourly_distribution: [u64; 24],
    /// Integrity-derived health section.
    pub health: SummaryHealth,
}

/// Folds a collection of entries into counts and distributions.
///
/// Single pass, no entry mutation. `total_logs` always equals the input
/// length; entries with unparseable timestamps simply do not contribute to
/// the hourly distribution.
#[must_use]
pub fn aggregate(entries: &[LogEntry]) -> LogStats {
    let mut stats = LogStats {
        total_logs: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        if let Some(ref location) = entry.location {
            *stats.sources.entry(location.clone()).or_default() += 1;
        }
        if let Some(ref level) = entry.level {
            *stats.levels.entry(level.clone()).or_default() += 1;
        }
        if let Some(name) = entry.agent_name() {
            *stats.agents.entry(name.to_string()).or_default() += 1;
        }
        if let Some(rule) = entry.rule.as_ref() {
            if let Some(ref id) = rule.id {
                *stats.rules.entry(id.clone()).or_default() += 1;
            }
            if let Some(level) = rule.level {
                *stats.severity_distribution.entry(level).or_default() += 1;
            }
        }
        if let Some(name) = entry.decoder.as_ref().and_then(|d| d.name.as_deref()) {
            *stats.decoders.entry(name.to_string()).or_default() += 1;
        }
        if let Some(ts) = entry.parsed_timestamp() {
            stats.hourly_distribution[ts.hour() as usize] += 1;
        }
    }

    stats
}

/// Counts occurrences preserving first-seen order, then ranks by count
/// descending. The stable sort keeps ties in first-seen order.
fn top_n<'a, I>(values: I, n: usize) -> Vec<CountedItem>
where
    I: Iterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for value in values {
        if !counts.contains_key(value) {
            order.push(value.to_string());
        }
        *counts.entry(value.to_string()).or_default() += 1;
    }

    let mut ranked: Vec<CountedItem> = order
        .into_iter()
        .map(|name| {
            let count = counts[&name];
            CountedItem { name, count }
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Composes [`aggregate`] with overview, top-N rankings and a health
/// section.
///
/// `top_n_limit` bounds the agent/rule rankings (the engine default is 5);
/// `warning_threshold` is forwarded to the integrity check.
#[must_use]
pub fn summarize(entries: &[LogEntry], top_n_limit: usize, warning_threshold: f64) -> LogSummary {
    let stats = aggregate(entries);
    let integrity = validate_integrity(entries, warning_threshold);

    let top_agents = top_n(entries.iter().filter_map(LogEntry::agent_name), top_n_limit);
    let top_rules = top_n(
        entries
            .iter()
            .filter_map(|e| e.rule.as_ref().and_then(|r| r.id.as_deref())),
        top_n_limit,
    );

    let error_rate = if entries.is_empty() {
        0.0
    } else {
        integrity.invalid_logs as f64 / entries.len() as f64
    };

    LogSummary {
        overview: Overview {
            total_logs: stats.total_logs,
            distinct_agents: stats.agents.len(),
            distinct_rules: stats.rules.len(),
        },
        top_agents,
        top_rules,
        levels: stats.levels,
        severity_distribution: stats.severity_distribution,
        hourly_distribution: stats.hourly_distribution,
        health: SummaryHealth {
            error_rate,
            valid_logs: integrity.valid_logs,
            invalid_logs: integrity.invalid_logs,
            warnings: integrity.warnings,
        },
    }
}
