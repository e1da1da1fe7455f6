//! API usage analytics: chart projections derived from the summary payload.

pub mod reducer;

use serde::Serialize;

use crate::model::AnalyticsSummary;
use reducer::{EndpointCount, EndpointLatency, EndpointOutcome};

/// Everything the analytics charts render, already ranked and truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub total_requests: i64,
    pub top_endpoints: Vec<EndpointCount>,
    pub slowest_endpoints: Vec<EndpointLatency>,
    pub busiest_endpoints: Vec<EndpointOutcome>,
}

impl AnalyticsView {
    pub fn from_summary(summary: &AnalyticsSummary, limit: usize) -> Self {
        Self {
            total_requests: summary.total_requests.unwrap_or(0),
            top_endpoints: reducer::endpoint_frequency(&summary.endpoint_stats, limit),
            slowest_endpoints: reducer::latency_ranking(&summary.response_time_stats, limit),
            busiest_endpoints: reducer::outcome_ranking(&summary.success_error_rates, limit),
        }
    }
}
