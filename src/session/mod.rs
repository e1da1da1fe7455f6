//! Dashboard session: the single owner of the in-memory working set.
//!
//! Poll cycles come in two groups: overview (global stats + countries) and
//! analytics (summary + timeline). Each cycle takes a [`CycleTicket`] when it
//! starts and hands its result back through [`Dashboard::complete`]. A result
//! is applied only if no newer cycle of the same group has been applied, so a
//! slow, stale response can never overwrite fresher data. A failed cycle
//! leaves the previous data in place and raises a transient [`Notice`].

use chrono::{DateTime, Duration, Utc};

use crate::analytics::AnalyticsView;
use crate::client::{AnalyticsData, FetchError, OverviewData};
use crate::config::DashConfig;
use crate::model::GlobalStats;
use crate::table::country::CountryColumn;
use crate::table::timeline::TimelineColumn;
use crate::table::{ReloadPolicy, SortedTable};

const OVERVIEW_FAILED: &str =
    "Failed to load outbreak data. Please check if the API server is running.";
const ANALYTICS_FAILED: &str = "Failed to load analytics data. Make sure the API is running.";

// ---------------------------------------------------------------------------
// Cycles
// ---------------------------------------------------------------------------

/// A group of fetches rendered together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    Overview,
    Analytics,
}

/// Issued when a cycle starts; identifies it on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    pub kind: CycleKind,
    pub generation: u64,
}

/// The fetched payload of one cycle.
#[derive(Debug)]
pub enum CycleResult {
    Overview(Result<OverviewData, FetchError>),
    Analytics(Result<AnalyticsData, FetchError>),
}

impl CycleResult {
    pub fn kind(&self) -> CycleKind {
        match self {
            Self::Overview(_) => CycleKind::Overview,
            Self::Analytics(_) => CycleKind::Analytics,
        }
    }
}

/// What [`Dashboard::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The working set was replaced.
    Applied,
    /// The fetch failed; previous data stays and a notice was raised.
    Failed,
    /// A newer cycle already landed; the result was dropped.
    Stale,
}

/// Generation counter for one cycle group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleGate {
    started: u64,
    applied: u64,
}

impl CycleGate {
    /// Start a cycle and return its generation.
    pub fn begin(&mut self) -> u64 {
        self.started += 1;
        self.started
    }

    /// Whether a result from `generation` is newer than what is displayed.
    pub fn is_current(&self, generation: u64) -> bool {
        generation > self.applied
    }

    /// Record that `generation` was applied. Returns `false` if it is stale.
    pub fn commit(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.applied = generation;
            true
        } else {
            false
        }
    }

    pub fn latest_started(&self) -> u64 {
        self.started
    }

    pub fn latest_applied(&self) -> u64 {
        self.applied
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A user-visible error message that dismisses itself after a delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    global: Option<GlobalStats>,
    countries: SortedTable<CountryColumn>,
    timeline: SortedTable<TimelineColumn>,
    analytics: Option<AnalyticsView>,
    top_n: usize,
    notice: Option<Notice>,
    notice_ttl: Duration,
    overview_gate: CycleGate,
    analytics_gate: CycleGate,
    overview_updated: Option<DateTime<Utc>>,
    analytics_updated: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(config: &DashConfig) -> Self {
        Self::with_policies(
            config.tables.countries_policy(),
            config.tables.timeline_policy(),
            config.dashboard.top_n,
            Duration::from_std(std::time::Duration::from_secs(config.dashboard.error_dismiss_secs))
                .unwrap_or_else(|_| Duration::days(365)),
        )
    }

    pub fn with_policies(
        countries: ReloadPolicy,
        timeline: ReloadPolicy,
        top_n: usize,
        notice_ttl: Duration,
    ) -> Self {
        Self {
            global: None,
            countries: SortedTable::new(countries, None),
            timeline: SortedTable::new(timeline, Some(TimelineColumn::Timestamp)),
            analytics: None,
            top_n,
            notice: None,
            notice_ttl,
            overview_gate: CycleGate::default(),
            analytics_gate: CycleGate::default(),
            overview_updated: None,
            analytics_updated: None,
        }
    }

    // -- Cycles --

    pub fn begin_cycle(&mut self, kind: CycleKind) -> CycleTicket {
        let generation = self.gate_mut(kind).begin();
        tracing::debug!(?kind, generation, "cycle started");
        CycleTicket { kind, generation }
    }

    /// Apply (or drop) a finished cycle.
    pub fn complete(&mut self, ticket: CycleTicket, result: CycleResult) -> CycleOutcome {
        debug_assert_eq!(ticket.kind, result.kind());

        if !self.gate_mut(ticket.kind).is_current(ticket.generation) {
            tracing::info!(kind = ?ticket.kind, generation = ticket.generation, "dropping stale cycle result");
            return CycleOutcome::Stale;
        }

        match result {
            CycleResult::Overview(Ok(data)) => {
                self.overview_gate.commit(ticket.generation);
                self.global = Some(data.global);
                self.countries.load(data.countries);
                self.overview_updated = Some(Utc::now());
                CycleOutcome::Applied
            }
            CycleResult::Analytics(Ok(data)) => {
                self.analytics_gate.commit(ticket.generation);
                self.analytics = Some(AnalyticsView::from_summary(&data.summary, self.top_n));
                self.timeline.load(data.timeline);
                self.analytics_updated = Some(Utc::now());
                CycleOutcome::Applied
            }
            CycleResult::Overview(Err(e)) => {
                tracing::warn!(generation = ticket.generation, error = %e, "overview cycle failed");
                self.raise(OVERVIEW_FAILED);
                CycleOutcome::Failed
            }
            CycleResult::Analytics(Err(e)) => {
                tracing::warn!(generation = ticket.generation, error = %e, "analytics cycle failed");
                self.raise(ANALYTICS_FAILED);
                CycleOutcome::Failed
            }
        }
    }

    fn gate_mut(&mut self, kind: CycleKind) -> &mut CycleGate {
        match kind {
            CycleKind::Overview => &mut self.overview_gate,
            CycleKind::Analytics => &mut self.analytics_gate,
        }
    }

    pub fn gate(&self, kind: CycleKind) -> CycleGate {
        match kind {
            CycleKind::Overview => self.overview_gate,
            CycleKind::Analytics => self.analytics_gate,
        }
    }

    // -- Sorting --

    /// A header click on the country table.
    pub fn sort_countries(&mut self, column: CountryColumn) {
        self.countries.sort_by(column);
    }

    /// A header click on the timeline table.
    pub fn sort_timeline(&mut self, column: TimelineColumn) {
        self.timeline.sort_by(column);
    }

    // -- Notices --

    /// Show `message`, replacing any visible notice.
    pub fn raise(&mut self, message: impl Into<String>) {
        let now = Utc::now();
        self.notice = Some(Notice {
            message: message.into(),
            raised_at: now,
            expires_at: now
                .checked_add_signed(self.notice_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    /// The notice, if it has not expired by `now`.
    pub fn notice_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_visible_at(now))
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice_at(Utc::now())
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // -- Working set --

    pub fn global(&self) -> Option<&GlobalStats> {
        self.global.as_ref()
    }

    pub fn countries(&self) -> &SortedTable<CountryColumn> {
        &self.countries
    }

    pub fn timeline(&self) -> &SortedTable<TimelineColumn> {
        &self.timeline
    }

    pub fn analytics(&self) -> Option<&AnalyticsView> {
        self.analytics.as_ref()
    }

    pub fn last_updated(&self, kind: CycleKind) -> Option<DateTime<Utc>> {
        match kind {
            CycleKind::Overview => self.overview_updated,
            CycleKind::Analytics => self.analytics_updated,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalyticsSummary, CountryRecord, TimelineEntry};
    use crate::table::{SortDirection, SortState};

    fn dashboard() -> Dashboard {
        Dashboard::new(&DashConfig::default())
    }

    fn country(name: &str, cases: i64) -> CountryRecord {
        CountryRecord {
            country: name.to_string(),
            total_cases: Some(cases),
            ..Default::default()
        }
    }

    fn entry(timestamp: &str) -> TimelineEntry {
        TimelineEntry {
            timestamp: timestamp.to_string(),
            endpoint: "/api/global".to_string(),
            method: "GET".to_string(),
            status_code: Some(200),
            response_time: Some(4.0),
        }
    }

    fn overview(countries: Vec<CountryRecord>) -> CycleResult {
        CycleResult::Overview(Ok(OverviewData {
            global: GlobalStats::default(),
            countries,
        }))
    }

    fn analytics(timeline: Vec<TimelineEntry>) -> CycleResult {
        let summary: AnalyticsSummary =
            serde_json::from_str(r#"{"totalRequests": 2, "endpointStats": {"/api/global": 2}}"#)
                .unwrap();
        CycleResult::Analytics(Ok(AnalyticsData { summary, timeline }))
    }

    fn failure() -> FetchError {
        FetchError::Status {
            path: "/analytics/timeline".to_string(),
            status: 503,
        }
    }

    #[test]
    fn gate_orders_generations() {
        let mut gate = CycleGate::default();
        let first = gate.begin();
        let second = gate.begin();
        assert!(gate.commit(second));
        assert!(!gate.commit(first));
        assert_eq!(gate.latest_applied(), second);
        assert_eq!(gate.latest_started(), 2);
    }

    #[test]
    fn applied_analytics_cycle_sorts_timeline_newest_first() {
        let mut dash = dashboard();
        let ticket = dash.begin_cycle(CycleKind::Analytics);
        let outcome = dash.complete(
            ticket,
            analytics(vec![entry("2024-01-01T00:00:00Z"), entry("2024-01-02T00:00:00Z")]),
        );

        assert_eq!(outcome, CycleOutcome::Applied);
        assert_eq!(dash.timeline().rows()[0].timestamp, "2024-01-02T00:00:00Z");
        assert_eq!(dash.analytics().unwrap().total_requests, 2);
        assert_eq!(dash.analytics().unwrap().top_endpoints[0].label, "/global");
        assert!(dash.last_updated(CycleKind::Analytics).is_some());
    }

    #[test]
    fn failed_cycle_keeps_previous_data_and_raises_notice() {
        let mut dash = dashboard();
        let ticket = dash.begin_cycle(CycleKind::Analytics);
        dash.complete(ticket, analytics(vec![entry("2024-01-01T00:00:00Z")]));

        let ticket = dash.begin_cycle(CycleKind::Analytics);
        let outcome = dash.complete(ticket, CycleResult::Analytics(Err(failure())));

        assert_eq!(outcome, CycleOutcome::Failed);
        assert_eq!(dash.timeline().len(), 1);
        assert!(dash.analytics().is_some());
        assert_eq!(dash.notice().unwrap().message, ANALYTICS_FAILED);
    }

    #[test]
    fn stale_result_does_not_overwrite_newer_data() {
        let mut dash = dashboard();
        let older = dash.begin_cycle(CycleKind::Overview);
        let newer = dash.begin_cycle(CycleKind::Overview);

        assert_eq!(dash.complete(newer, overview(vec![country("New", 2)])), CycleOutcome::Applied);
        assert_eq!(dash.complete(older, overview(vec![country("Old", 1)])), CycleOutcome::Stale);
        assert_eq!(dash.countries().rows()[0].country, "New");
    }

    #[test]
    fn stale_failure_raises_no_notice() {
        let mut dash = dashboard();
        let older = dash.begin_cycle(CycleKind::Overview);
        let newer = dash.begin_cycle(CycleKind::Overview);
        dash.complete(newer, overview(vec![country("New", 2)]));

        let outcome = dash.complete(older, CycleResult::Overview(Err(failure())));
        assert_eq!(outcome, CycleOutcome::Stale);
        assert!(dash.notice().is_none());
    }

    #[test]
    fn older_cycle_landing_first_is_still_applied() {
        let mut dash = dashboard();
        let older = dash.begin_cycle(CycleKind::Overview);
        let newer = dash.begin_cycle(CycleKind::Overview);

        assert_eq!(dash.complete(older, overview(vec![country("Old", 1)])), CycleOutcome::Applied);
        assert_eq!(dash.complete(newer, overview(vec![country("New", 2)])), CycleOutcome::Applied);
        assert_eq!(dash.countries().rows()[0].country, "New");
    }

    #[test]
    fn groups_have_independent_gates() {
        let mut dash = dashboard();
        let a = dash.begin_cycle(CycleKind::Analytics);
        let o = dash.begin_cycle(CycleKind::Overview);
        assert_eq!(a.generation, 1);
        assert_eq!(o.generation, 1);
        assert_eq!(dash.complete(o, overview(vec![])), CycleOutcome::Applied);
        assert_eq!(dash.complete(a, analytics(vec![])), CycleOutcome::Applied);
    }

    #[test]
    fn country_sort_survives_reload_by_default() {
        let mut dash = dashboard();
        let ticket = dash.begin_cycle(CycleKind::Overview);
        dash.complete(ticket, overview(vec![country("US", 100), country("UK", 50)]));
        dash.sort_countries(CountryColumn::TotalCases);
        assert_eq!(dash.countries().rows()[0].country, "UK");

        let ticket = dash.begin_cycle(CycleKind::Overview);
        dash.complete(ticket, overview(vec![country("US", 100), country("UK", 50)]));
        assert_eq!(
            dash.countries().state(),
            SortState::Sorted { column: CountryColumn::TotalCases, direction: SortDirection::Asc }
        );
        // Rows arrive in fetch order; the next click toggles.
        assert_eq!(dash.countries().rows()[0].country, "US");
        dash.sort_countries(CountryColumn::TotalCases);
        assert_eq!(dash.countries().rows()[0].country, "US");
        assert_eq!(dash.countries().state().direction(), Some(SortDirection::Desc));
    }

    #[test]
    fn timeline_user_sort_is_reset_on_reload() {
        let mut dash = dashboard();
        let ticket = dash.begin_cycle(CycleKind::Analytics);
        dash.complete(ticket, analytics(vec![entry("2024-01-01T00:00:00Z")]));
        dash.sort_timeline(TimelineColumn::ResponseTime);

        let ticket = dash.begin_cycle(CycleKind::Analytics);
        dash.complete(ticket, analytics(vec![entry("2024-01-01T00:00:00Z")]));
        assert_eq!(
            dash.timeline().state(),
            SortState::Sorted { column: TimelineColumn::Timestamp, direction: SortDirection::Desc }
        );
    }

    #[test]
    fn notice_expires_and_can_be_dismissed() {
        let mut dash = dashboard();
        dash.raise("boom");
        let notice = dash.notice().unwrap().clone();
        assert_eq!(notice.expires_at - notice.raised_at, Duration::seconds(10));
        assert!(dash.notice_at(notice.raised_at + Duration::seconds(11)).is_none());

        dash.dismiss_notice();
        assert!(dash.notice().is_none());
    }

    #[test]
    fn huge_dismiss_delay_keeps_notice_without_overflow() {
        let mut config = DashConfig::default();
        config.dashboard.error_dismiss_secs = 9_000_000_000_000;
        let mut dash = Dashboard::new(&config);

        dash.raise("boom");
        let notice = dash.notice().unwrap();
        assert_eq!(notice.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(dash.notice_at(notice.raised_at + Duration::days(3650)).is_some());
    }

    #[test]
    fn timeline_is_newest_first_on_first_load_when_kept() {
        let mut config = DashConfig::default();
        config.tables.timeline_reset_on_reload = false;
        let mut dash = Dashboard::new(&config);

        let ticket = dash.begin_cycle(CycleKind::Analytics);
        dash.complete(
            ticket,
            analytics(vec![entry("2024-01-01T00:00:00Z"), entry("2024-01-02T00:00:00Z")]),
        );
        assert_eq!(dash.timeline().rows()[0].timestamp, "2024-01-02T00:00:00Z");
    }
}
