/// Configuration schema and defaults for outbreak-dash.
///
/// Sections: `[api]`, `[dashboard]`, `[tables]`, `[logging]`. Every field has
/// a built-in default; config files only need the keys they change.
use serde::{Deserialize, Serialize};

use crate::analytics::reducer::DEFAULT_LIMIT;
use crate::table::ReloadPolicy;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration, mapping to `~/.outbreak-dash/config.toml` and
/// `.outbreak-dash.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub tables: TablesConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Endpoints shown per analytics chart.
    pub top_n: usize,
    /// Seconds between poll cycles in `watch` mode.
    pub refresh_interval_secs: u64,
    /// Seconds an error notice stays visible before auto-dismissal.
    pub error_dismiss_secs: u64,
    /// Country used by `insights` when none is given.
    pub default_country: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_LIMIT,
            refresh_interval_secs: 30,
            error_dismiss_secs: 10,
            default_country: "US".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [tables]
// ---------------------------------------------------------------------------

/// Sort-state behavior of each table when fresh data arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Reset the country table to fetch order on every reload.
    pub countries_reset_on_reload: bool,
    /// Reset the timeline to newest-first on every reload.
    pub timeline_reset_on_reload: bool,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            countries_reset_on_reload: false,
            timeline_reset_on_reload: true,
        }
    }
}

impl TablesConfig {
    pub fn countries_policy(&self) -> ReloadPolicy {
        ReloadPolicy::from_reset_flag(self.countries_reset_on_reload)
    }

    pub fn timeline_policy(&self) -> ReloadPolicy {
        ReloadPolicy::from_reset_flag(self.timeline_reset_on_reload)
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Diagnostic filter: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`,
    /// or any `tracing` filter directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The commented config file written by `config init`.
    pub fn default_toml() -> String {
        r#"# outbreak-dash configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (OUTBREAK_DASH_*)
#   2. Project config (.outbreak-dash.toml in current directory)
#   3. User global config (~/.outbreak-dash/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://localhost:8080/api"
timeout_ms = 10000

[dashboard]
top_n = 5                      # Endpoints per analytics chart
refresh_interval_secs = 30     # Poll interval for `watch`
error_dismiss_secs = 10        # Error notices auto-dismiss after this long
default_country = "US"         # Country for `insights` without --country

[tables]
countries_reset_on_reload = false   # Keep the country sort across reloads
timeline_reset_on_reload = true     # Timeline returns to newest-first

[logging]
level = "warn"                 # Or set OUTBREAK_DASH_LOG
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
