//! Wire types for the outbreak and analytics REST backend.
//!
//! Every payload is decoded leniently: numeric fields that are absent, `null`
//! or not numbers become `None` (rendered as `--`, sorted as 0), and absent
//! lists/maps become empty. A successful response with malformed fields is
//! never an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An aggregate map keyed by endpoint path, in server insertion order.
pub type AggregateMap = Map<String, Value>;

// ---------------------------------------------------------------------------
// Outbreak data
// ---------------------------------------------------------------------------

/// `GET /global` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_deaths: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_recovered: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub active_cases: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One row of `GET /countries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub new_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_deaths: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_recovered: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub active_cases: Option<i64>,
}

// ---------------------------------------------------------------------------
// API analytics
// ---------------------------------------------------------------------------

/// `GET /analytics/summary` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_requests: Option<i64>,
    /// Request count per endpoint.
    #[serde(default, deserialize_with = "lenient_map")]
    pub endpoint_stats: AggregateMap,
    /// Average response time (ms) per endpoint.
    #[serde(default, deserialize_with = "lenient_map")]
    pub response_time_stats: AggregateMap,
    /// `{success, error}` pair per endpoint.
    #[serde(default, deserialize_with = "lenient_map")]
    pub success_error_rates: AggregateMap,
}

/// One row of `GET /analytics/timeline`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status_code: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub response_time: Option<f64>,
}

// ---------------------------------------------------------------------------
// AI narratives
// ---------------------------------------------------------------------------

/// A titled recommendation inside an insights payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Audience-specific precaution tips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecautionGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tips: Vec<String>,
}

/// `GET /analytics/ai-insights` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInsights {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_requests: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_response_time: Option<f64>,
    /// Percentage of requests that failed.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub error_rate: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slowest_endpoint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_assessment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<Recommendation>,
}

/// `GET /ai-insights/country/{name}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInsights {
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub new_cases: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_deaths: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_recovered: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub active_cases: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_assessment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub targeted_precautions: Vec<PrecautionGroup>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub generated_at: String,
}

impl CountryInsights {
    /// Active cases as a percentage of total cases; `0.0` when there are none.
    pub fn active_share_pct(&self) -> f64 {
        share_pct(self.active_cases, self.total_cases)
    }

    /// New cases as a percentage of total cases; `0.0` when there are none.
    pub fn daily_increase_pct(&self) -> f64 {
        share_pct(self.new_cases, self.total_cases)
    }
}

fn share_pct(part: Option<i64>, total: Option<i64>) -> f64 {
    let total = total.unwrap_or(0);
    if total <= 0 {
        0.0
    } else {
        (part.unwrap_or(0) as f64 / total as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Lenient value coercion
// ---------------------------------------------------------------------------

/// Numeric value of a JSON node, or `0.0` when it is missing or not a number.
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Non-negative integer count of a JSON node, `0` when missing or invalid.
pub fn count_or_zero(value: Option<&Value>) -> u64 {
    match value {
        Some(v) => v
            .as_u64()
            .unwrap_or_else(|| number_or_zero(Some(v)).max(0.0) as u64),
        None => 0,
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().filter(|n| n.is_finite()).map(|n| n as i64))
    }))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite()))
}

fn lenient_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AggregateMap, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn country_record_decodes_camel_case() {
        let record: CountryRecord = serde_json::from_value(json!({
            "country": "India",
            "totalCases": 100,
            "newCases": 5,
            "totalDeaths": 2,
            "totalRecovered": 90,
            "activeCases": 8
        }))
        .unwrap();

        assert_eq!(record.country, "India");
        assert_eq!(record.total_cases, Some(100));
        assert_eq!(record.new_cases, Some(5));
        assert_eq!(record.active_cases, Some(8));
    }

    #[test]
    fn missing_and_malformed_numbers_become_none() {
        let record: CountryRecord = serde_json::from_value(json!({
            "country": "Nowhere",
            "totalCases": "lots",
            "newCases": null
        }))
        .unwrap();

        assert_eq!(record.total_cases, None);
        assert_eq!(record.new_cases, None);
        assert_eq!(record.total_deaths, None);
    }

    #[test]
    fn summary_tolerates_missing_maps() {
        let summary: AnalyticsSummary =
            serde_json::from_value(json!({ "totalRequests": 12, "endpointStats": null })).unwrap();
        assert_eq!(summary.total_requests, Some(12));
        assert!(summary.endpoint_stats.is_empty());
        assert!(summary.response_time_stats.is_empty());
        assert!(summary.success_error_rates.is_empty());
    }

    #[test]
    fn summary_maps_keep_server_order() {
        let raw = r#"{"endpointStats": {"/z": 1, "/a": 2, "/m": 3}}"#;
        let summary: AnalyticsSummary = serde_json::from_str(raw).unwrap();
        let keys: Vec<&str> = summary.endpoint_stats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/z", "/a", "/m"]);
    }

    #[test]
    fn timeline_entry_decodes() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "endpoint": "/api/global",
            "method": "GET",
            "statusCode": 200,
            "responseTime": 12.5
        }))
        .unwrap();
        assert_eq!(entry.status_code, Some(200));
        assert_eq!(entry.response_time, Some(12.5));
    }

    #[test]
    fn system_insights_null_recommendations() {
        let insights: SystemInsights = serde_json::from_value(json!({
            "totalRequests": 40,
            "avgResponseTime": 15.25,
            "errorRate": 2.5,
            "slowestEndpoint": "/api/countries",
            "overallAssessment": "Healthy",
            "recommendations": null
        }))
        .unwrap();
        assert!(insights.recommendations.is_empty());
        assert_eq!(insights.slowest_endpoint, "/api/countries");
    }

    #[test]
    fn country_insights_percentages() {
        let insights = CountryInsights {
            total_cases: Some(1000),
            active_cases: Some(250),
            new_cases: Some(3),
            ..Default::default()
        };
        assert!((insights.active_share_pct() - 25.0).abs() < 1e-9);
        assert!((insights.daily_increase_pct() - 0.3).abs() < 1e-9);

        let empty = CountryInsights::default();
        assert_eq!(empty.active_share_pct(), 0.0);
        assert_eq!(empty.daily_increase_pct(), 0.0);
    }

    #[test]
    fn coercion_helpers_default_to_zero() {
        assert_eq!(number_or_zero(None), 0.0);
        assert_eq!(number_or_zero(Some(&json!("x"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!(3.5))), 3.5);
        assert_eq!(count_or_zero(Some(&json!(7))), 7);
        assert_eq!(count_or_zero(Some(&json!(-4))), 0);
        assert_eq!(count_or_zero(Some(&json!(null))), 0);
    }
}
