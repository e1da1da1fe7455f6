//! API request timeline table.
//!
//! Canonical order is newest first: the timestamp column defaults to
//! descending, every other column to ascending.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};

use super::{SortColumn, SortDirection, SortKey, UnknownColumn};
use crate::model::TimelineEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimelineColumn {
    RowNumber,
    Timestamp,
    Endpoint,
    Method,
    StatusCode,
    ResponseTime,
}

impl TimelineColumn {
    pub const ALL: [TimelineColumn; 6] = [
        Self::RowNumber,
        Self::Timestamp,
        Self::Endpoint,
        Self::Method,
        Self::StatusCode,
        Self::ResponseTime,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RowNumber => "row",
            Self::Timestamp => "timestamp",
            Self::Endpoint => "endpoint",
            Self::Method => "method",
            Self::StatusCode => "status-code",
            Self::ResponseTime => "response-time",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::RowNumber => "#",
            Self::Timestamp => "Timestamp",
            Self::Endpoint => "Endpoint",
            Self::Method => "Method",
            Self::StatusCode => "Status",
            Self::ResponseTime => "Time (ms)",
        }
    }
}

impl SortColumn for TimelineColumn {
    type Row = TimelineEntry;

    fn is_sortable(self) -> bool {
        self != Self::RowNumber
    }

    fn default_direction(self) -> SortDirection {
        match self {
            Self::Timestamp => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    fn key<'r>(self, row: &'r TimelineEntry) -> SortKey<'r> {
        match self {
            Self::RowNumber => SortKey::Number(None),
            Self::Timestamp => SortKey::Number(timestamp_millis(&row.timestamp).map(|ms| ms as f64)),
            Self::Endpoint => SortKey::Text(&row.endpoint),
            Self::Method => SortKey::Text(&row.method),
            Self::StatusCode => SortKey::Number(row.status_code.map(|c| c as f64)),
            Self::ResponseTime => SortKey::Number(row.response_time),
        }
    }
}

impl fmt::Display for TimelineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimelineColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        if let Ok(index) = wanted.parse::<usize>()
            && let Some(column) = Self::from_index(index)
        {
            return Ok(column);
        }
        let wanted = match wanted.as_str() {
            "status" => "statuscode".to_string(),
            "time" | "latency" => "responsetime".to_string(),
            _ => wanted,
        };
        Self::ALL
            .into_iter()
            .find(|c| c.name().replace('-', "") == wanted)
            .ok_or_else(|| UnknownColumn {
                input: s.to_string(),
                expected: Self::ALL.map(Self::name).join(", "),
            })
    }
}

/// Milliseconds since the Unix epoch for an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (with offset) and offset-less date-times, which are read
/// as UTC. Returns `None` for anything else.
pub fn timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ReloadPolicy, SortState, SortedTable, sort};

    fn entry(timestamp: &str, endpoint: &str, status: i64, time: f64) -> TimelineEntry {
        TimelineEntry {
            timestamp: timestamp.to_string(),
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            status_code: Some(status),
            response_time: Some(time),
        }
    }

    #[test]
    fn fresh_load_puts_latest_first() {
        let mut table = SortedTable::new(ReloadPolicy::Reset, Some(TimelineColumn::Timestamp));
        table.load(vec![
            entry("2024-01-01T00:00:00Z", "/api/global", 200, 5.0),
            entry("2024-01-02T00:00:00Z", "/api/countries", 200, 7.0),
        ]);
        assert_eq!(table.rows()[0].timestamp, "2024-01-02T00:00:00Z");
        assert_eq!(
            table.state(),
            SortState::Sorted {
                column: TimelineColumn::Timestamp,
                direction: SortDirection::Desc
            }
        );
    }

    #[test]
    fn reload_resets_a_user_sort() {
        let mut table = SortedTable::new(ReloadPolicy::Reset, Some(TimelineColumn::Timestamp));
        let data = vec![
            entry("2024-01-01T00:00:00Z", "/b", 200, 5.0),
            entry("2024-01-02T00:00:00Z", "/a", 200, 7.0),
        ];
        table.load(data.clone());
        table.sort_by(TimelineColumn::Endpoint);
        assert_eq!(table.rows()[0].endpoint, "/a");

        table.load(data);
        assert_eq!(table.state().active_column(), Some(TimelineColumn::Timestamp));
        assert_eq!(table.rows()[0].timestamp, "2024-01-02T00:00:00Z");
    }

    #[test]
    fn clicking_timestamp_after_load_toggles_to_ascending() {
        let mut table = SortedTable::new(ReloadPolicy::Reset, Some(TimelineColumn::Timestamp));
        table.load(vec![
            entry("2024-01-01T00:00:00Z", "/a", 200, 1.0),
            entry("2024-01-02T00:00:00Z", "/b", 200, 1.0),
        ]);
        table.sort_by(TimelineColumn::Timestamp);
        assert_eq!(table.rows()[0].timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(table.state().direction(), Some(SortDirection::Asc));
    }

    #[test]
    fn non_timestamp_columns_default_ascending() {
        let mut rows = vec![
            entry("2024-01-01T00:00:00Z", "/a", 500, 30.0),
            entry("2024-01-01T00:00:01Z", "/b", 200, 10.0),
        ];
        let state = sort(&mut rows, TimelineColumn::StatusCode, SortState::Unsorted);
        assert_eq!(rows[0].status_code, Some(200));
        assert_eq!(state.direction(), Some(SortDirection::Asc));

        sort(&mut rows, TimelineColumn::ResponseTime, state);
        assert_eq!(rows[0].response_time, Some(10.0));
    }

    #[test]
    fn method_sort_is_case_insensitive() {
        let mut rows = vec![
            TimelineEntry { method: "post".into(), ..Default::default() },
            TimelineEntry { method: "GET".into(), ..Default::default() },
        ];
        sort(&mut rows, TimelineColumn::Method, SortState::Unsorted);
        assert_eq!(rows[0].method, "GET");
    }

    #[test]
    fn timestamp_parsing() {
        assert_eq!(timestamp_millis("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(timestamp_millis("1970-01-01T00:00:01+01:00"), Some(-3_599_000));
        assert_eq!(timestamp_millis("1970-01-01T00:00:02.5"), Some(2500));
        assert_eq!(timestamp_millis("yesterday"), None);
    }

    #[test]
    fn unparsable_timestamp_sorts_as_epoch() {
        let mut rows = vec![
            entry("2024-01-01T00:00:00Z", "/a", 200, 1.0),
            entry("garbage", "/b", 200, 1.0),
        ];
        sort(&mut rows, TimelineColumn::Timestamp, SortState::Unsorted);
        assert_eq!(rows[1].endpoint, "/b");
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("status".parse(), Ok(TimelineColumn::StatusCode));
        assert_eq!("response_time".parse(), Ok(TimelineColumn::ResponseTime));
        assert_eq!("latency".parse(), Ok(TimelineColumn::ResponseTime));
        assert_eq!("1".parse(), Ok(TimelineColumn::Timestamp));
        assert!("body".parse::<TimelineColumn>().is_err());
    }
}
