//! Top-N reduction of per-endpoint aggregate maps.
//!
//! Each reducer ranks one aggregate map by its key (descending), keeps ties
//! in server insertion order, and truncates to `limit`:
//!
//! - **Frequency**: request count
//! - **Latency**: average response time, rounded to 2 decimals after ranking
//! - **Outcomes**: `success + error`, carrying both raw counts

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{AggregateMap, count_or_zero, number_or_zero};

/// Number of endpoints shown per chart unless configured otherwise.
pub const DEFAULT_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// One bar of the request-count chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointCount {
    pub label: String,
    pub count: u64,
}

/// One point of the latency chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointLatency {
    pub label: String,
    pub avg_ms: f64,
}

/// One stacked bar of the success/error chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointOutcome {
    pub label: String,
    pub success: u64,
    pub error: u64,
}

impl EndpointOutcome {
    pub fn total(&self) -> u64 {
        self.success.saturating_add(self.error)
    }
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

/// Most-requested endpoints.
pub fn endpoint_frequency(stats: &AggregateMap, limit: usize) -> Vec<EndpointCount> {
    let ranked = top_n(
        stats.iter().map(|(path, v)| (path, count_or_zero(Some(v)))),
        limit,
        |count| *count as f64,
    );

    ranked
        .into_iter()
        .map(|(path, count)| EndpointCount {
            label: endpoint_label(path).to_string(),
            count,
        })
        .collect()
}

/// Slowest endpoints by average response time.
pub fn latency_ranking(stats: &AggregateMap, limit: usize) -> Vec<EndpointLatency> {
    let ranked = top_n(
        stats.iter().map(|(path, v)| (path, number_or_zero(Some(v)))),
        limit,
        |avg| *avg,
    );

    ranked
        .into_iter()
        .map(|(path, avg)| EndpointLatency {
            label: endpoint_label(path).to_string(),
            avg_ms: round2(avg),
        })
        .collect()
}

/// Busiest endpoints by total volume, with their success/error split.
pub fn outcome_ranking(rates: &AggregateMap, limit: usize) -> Vec<EndpointOutcome> {
    let ranked = top_n(
        rates.iter().map(|(path, v)| {
            let success = count_or_zero(v.get("success"));
            let error = count_or_zero(v.get("error"));
            (path, (success, error))
        }),
        limit,
        |(success, error)| success.saturating_add(*error) as f64,
    );

    ranked
        .into_iter()
        .map(|(path, (success, error))| EndpointOutcome {
            label: endpoint_label(path).to_string(),
            success,
            error,
        })
        .collect()
}

/// Stable descending sort by `rank`, truncated to `limit`.
fn top_n<'a, T>(
    entries: impl Iterator<Item = (&'a String, T)>,
    limit: usize,
    rank: impl Fn(&T) -> f64,
) -> Vec<(&'a str, T)> {
    let mut entries: Vec<(&str, T)> = entries.map(|(path, v)| (path.as_str(), v)).collect();
    entries.sort_by(|(_, a), (_, b)| rank(b).partial_cmp(&rank(a)).unwrap_or(Ordering::Equal));
    entries.truncate(limit);
    entries
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Chart label for an endpoint path: a leading `/api` is cut off by position,
/// so `/api/countries` becomes `/countries` and `/apix` becomes `x`.
pub fn endpoint_label(path: &str) -> &str {
    path.strip_prefix("/api").unwrap_or(path)
}

/// Round to 2 decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
