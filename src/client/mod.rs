/// Blocking HTTP client for the outbreak/analytics backend.
///
/// Uses a shared `ureq` agent with the configured timeout. Every endpoint is
/// read-only `GET` returning JSON. Any transport error, non-2xx status, or
/// undecodable body is a [`FetchError`]; a 404 on the per-country lookup is
/// reported as [`FetchError::CountryNotFound`] so callers can name the key.
///
/// Fetches that belong to one poll cycle are issued concurrently through
/// [`fetch_both`]; the cycle fails as a whole if either side fails.
use std::thread;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::schema::ApiConfig;
use crate::model::{
    AnalyticsSummary, CountryInsights, CountryRecord, GlobalStats, SystemInsights, TimelineEntry,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{path} returned 404 Not Found")]
    NotFound { path: String },

    #[error("Country \"{country}\" not found. Please check the spelling and try again.")]
    CountryNotFound { country: String },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("could not decode {path} response: {source}")]
    Decode {
        path: String,
        source: std::io::Error,
    },

    #[error("a concurrent fetch worker panicked")]
    WorkerPanicked,
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::CountryNotFound { .. })
    }
}

// ---------------------------------------------------------------------------
// Cycle payloads
// ---------------------------------------------------------------------------

/// Global stats and the country list, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewData {
    pub global: GlobalStats,
    pub countries: Vec<CountryRecord>,
}

/// Analytics summary and request timeline, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsData {
    pub summary: AnalyticsSummary,
    pub timeline: Vec<TimelineEntry>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Build a client for `base_url` (e.g. `http://localhost:8080/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let invalid = |reason: String| FetchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()));
        }

        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self {
            base_url: parsed,
            agent,
        })
    }

    /// Build a client from the resolved `[api]` config.
    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET /global`
    pub fn global_stats(&self) -> Result<GlobalStats, FetchError> {
        self.get_json(&["global"])
    }

    /// `GET /countries`
    pub fn countries(&self) -> Result<Vec<CountryRecord>, FetchError> {
        self.get_json::<Option<Vec<CountryRecord>>>(&["countries"])
            .map(Option::unwrap_or_default)
    }

    /// `GET /analytics/summary`
    pub fn analytics_summary(&self) -> Result<AnalyticsSummary, FetchError> {
        self.get_json(&["analytics", "summary"])
    }

    /// `GET /analytics/timeline`
    pub fn timeline(&self) -> Result<Vec<TimelineEntry>, FetchError> {
        self.get_json::<Option<Vec<TimelineEntry>>>(&["analytics", "timeline"])
            .map(Option::unwrap_or_default)
    }

    /// `GET /analytics/ai-insights`
    pub fn system_insights(&self) -> Result<SystemInsights, FetchError> {
        self.get_json(&["analytics", "ai-insights"])
    }

    /// `GET /ai-insights/country/{name}`
    pub fn country_insights(&self, country: &str) -> Result<CountryInsights, FetchError> {
        let country = country.trim();
        self.get_json(&["ai-insights", "country", country])
            .map_err(|e| match e {
                FetchError::NotFound { .. } => FetchError::CountryNotFound {
                    country: country.to_string(),
                },
                other => other,
            })
    }

    /// Global stats + countries, concurrently.
    pub fn fetch_overview(&self) -> Result<OverviewData, FetchError> {
        let (global, countries) = fetch_both(|| self.global_stats(), || self.countries())?;
        Ok(OverviewData { global, countries })
    }

    /// Analytics summary + timeline, concurrently.
    pub fn fetch_analytics(&self) -> Result<AnalyticsData, FetchError> {
        let (summary, timeline) = fetch_both(|| self.analytics_summary(), || self.timeline())?;
        Ok(AnalyticsData { summary, timeline })
    }

    /// Whether the backend answers `GET /global` successfully.
    pub fn is_healthy(&self) -> bool {
        self.global_stats().is_ok()
    }

    /// Full URL for a path below the base, each segment percent-encoded.
    pub fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, FetchError> {
        let url = self.endpoint_url(segments);
        let path = format!("/{}", segments.join("/"));
        let started = Instant::now();

        let result = self.agent.request_url("GET", &url).call();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => {
                tracing::debug!(%path, status = resp.status(), elapsed_ms, "fetched");
                resp.into_json::<T>()
                    .map_err(|source| FetchError::Decode { path, source })
            }
            Err(ureq::Error::Status(404, _)) => {
                tracing::debug!(%path, elapsed_ms, "not found");
                Err(FetchError::NotFound { path })
            }
            Err(ureq::Error::Status(status, _)) => {
                tracing::debug!(%path, status, elapsed_ms, "error status");
                Err(FetchError::Status { path, status })
            }
            Err(ureq::Error::Transport(transport)) => {
                tracing::debug!(%path, elapsed_ms, error = %transport, "transport error");
                Err(FetchError::Transport {
                    path,
                    message: transport.to_string(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Concurrent fetch group
// ---------------------------------------------------------------------------

/// Run two fetches concurrently and wait for both.
///
/// Fails if either fails; when both fail, the first one's error is returned.
pub fn fetch_both<A, B>(
    first: impl FnOnce() -> Result<A, FetchError> + Send,
    second: impl FnOnce() -> Result<B, FetchError> + Send,
) -> Result<(A, B), FetchError>
where
    A: Send,
    B: Send,
{
    thread::scope(|scope| {
        let handle = scope.spawn(second);
        let first = first();
        let second = handle.join().unwrap_or(Err(FetchError::WorkerPanicked));
        Ok((first?, second?))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
