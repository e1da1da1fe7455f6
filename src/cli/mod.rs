//! CLI command implementations for outbreak-dash.
//!
//! Provides subcommand handlers for:
//! - `outbreak-dash global`: global stat cards
//! - `outbreak-dash countries`: sortable, searchable country table
//! - `outbreak-dash timeline`: recent API requests, newest first
//! - `outbreak-dash analytics`: top-N endpoint charts
//! - `outbreak-dash insights` / `system-insights`: narrative reports
//! - `outbreak-dash watch`: polling dashboard
//! - `outbreak-dash health`: config and backend reachability
//! - `outbreak-dash config show|init|set|reset`: configuration management

use std::io::IsTerminal;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use crate::analytics::AnalyticsView;
use crate::client::{ApiClient, FetchError};
use crate::config::{self, DashConfig};
use crate::model::{CountryInsights, CountryRecord, GlobalStats, SystemInsights, TimelineEntry};
use crate::session::{CycleKind, CycleOutcome, CycleResult, CycleTicket, Dashboard};
use crate::table::country::{self, CountryColumn};
use crate::table::timeline::TimelineColumn;
use crate::table::{ReloadPolicy, SortDirection, SortState, SortedTable};

const GLOBAL_FAILED: &str =
    "Failed to load global statistics. Please check if the API server is running.";
const COUNTRIES_FAILED: &str =
    "Failed to load country data. Please check if the API server is running.";
const ANALYTICS_FAILED: &str = "Failed to load analytics data. Make sure the API is running.";

/// Longest accepted `watch` poll interval (one day).
const MAX_WATCH_INTERVAL_SECS: u64 = 86_400;

/// Output format for table commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn connect(cfg: &DashConfig) -> Result<ApiClient> {
    ApiClient::from_config(&cfg.api).context("Cannot build the API client; check `api.base_url`")
}

// ---------------------------------------------------------------------------
// outbreak-dash global
// ---------------------------------------------------------------------------

/// Show the global stat cards.
pub fn run_global(cfg: &DashConfig) -> Result<()> {
    let stats = connect(cfg)?.global_stats().context(GLOBAL_FAILED)?;

    println!("{}", "Global Outbreak Statistics".bold().cyan());
    println!("{}", "=".repeat(50));
    print_global_cards(&stats);
    Ok(())
}

fn print_global_cards(stats: &GlobalStats) {
    println!(
        "  {} {:>16}",
        "Total Cases:    ".bold(),
        format_number(stats.total_cases).yellow()
    );
    println!(
        "  {} {:>16}",
        "Total Deaths:   ".bold(),
        format_number(stats.total_deaths).red()
    );
    println!(
        "  {} {:>16}",
        "Total Recovered:".bold(),
        format_number(stats.total_recovered).green()
    );
    println!(
        "  {} {:>16}",
        "Active Cases:   ".bold(),
        format_number(stats.active_cases).blue()
    );
    if let Some(updated) = stats.last_updated.as_deref() {
        println!("  {}", format!("Last updated: {updated}").dimmed());
    }
}

// ---------------------------------------------------------------------------
// outbreak-dash countries
// ---------------------------------------------------------------------------

/// Fetch the country table, apply each `--sort` as a header click, filter.
pub fn run_countries(
    cfg: &DashConfig,
    sorts: &[String],
    search: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let columns = sorts
        .iter()
        .map(|s| s.parse::<CountryColumn>())
        .collect::<Result<Vec<_>, _>>()?;

    let rows = connect(cfg)?.countries().context(COUNTRIES_FAILED)?;

    let mut table = SortedTable::new(cfg.tables.countries_policy(), None);
    table.load(rows);
    for column in columns {
        table.sort_by(column);
    }

    let query = search.unwrap_or("");
    let visible = country::filter_countries(table.rows(), query);
    let state = table.state();

    match format {
        OutputFormat::Json => print_countries_json(&visible, state)?,
        OutputFormat::Csv => print_countries_csv(&visible),
        OutputFormat::Table => {
            if visible.is_empty() && !query.trim().is_empty() {
                println!("{}", format!("No countries match '{}'.", query.trim()).yellow());
            } else {
                print_countries_table(&visible, state, usize::MAX);
            }
        }
    }
    Ok(())
}

fn print_countries_table(rows: &[&CountryRecord], state: SortState<CountryColumn>, max_rows: usize) {
    let header = |c: CountryColumn| sort_header(c.header(), state.active_column() == Some(c), state);
    println!(
        "  {:>4} {:<24} {:>14} {:>12} {:>12} {:>14} {:>12}",
        header(CountryColumn::RowNumber),
        header(CountryColumn::Country),
        header(CountryColumn::TotalCases),
        header(CountryColumn::NewCases),
        header(CountryColumn::TotalDeaths),
        header(CountryColumn::TotalRecovered),
        header(CountryColumn::ActiveCases),
    );
    println!("  {}", "-".repeat(98));

    for (i, r) in rows.iter().take(max_rows).enumerate() {
        let line = format!(
            "  {:>4} {:<24} {:>14} {:>12} {:>12} {:>14} {:>12}",
            i + 1,
            truncate(&r.country, 24),
            format_number(r.total_cases),
            format_number(r.new_cases),
            format_number(r.total_deaths),
            format_number(r.total_recovered),
            format_number(r.active_cases),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    if rows.len() > max_rows {
        println!("  {}", format!("… {} more", rows.len() - max_rows).dimmed());
    }
}

fn print_countries_json(rows: &[&CountryRecord], state: SortState<CountryColumn>) -> Result<()> {
    let value = serde_json::json!({
        "sort": sort_json(state.active_column().map(CountryColumn::name), state.direction()),
        "countries": rows,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_countries_csv(rows: &[&CountryRecord]) {
    println!("country,total_cases,new_cases,total_deaths,total_recovered,active_cases");
    for r in rows {
        println!(
            "{},{},{},{},{},{}",
            csv_field(&r.country),
            csv_number(r.total_cases),
            csv_number(r.new_cases),
            csv_number(r.total_deaths),
            csv_number(r.total_recovered),
            csv_number(r.active_cases),
        );
    }
}

// ---------------------------------------------------------------------------
// outbreak-dash timeline
// ---------------------------------------------------------------------------

/// Fetch the request timeline; newest first, then each `--sort` click.
pub fn run_timeline(cfg: &DashConfig, sorts: &[String], format: OutputFormat) -> Result<()> {
    let columns = sorts
        .iter()
        .map(|s| s.parse::<TimelineColumn>())
        .collect::<Result<Vec<_>, _>>()?;

    let data = connect(cfg)?.fetch_analytics().context(ANALYTICS_FAILED)?;

    // A one-shot load is always a fresh load.
    let mut table = SortedTable::new(ReloadPolicy::Reset, Some(TimelineColumn::Timestamp));
    table.load(data.timeline);
    for column in columns {
        table.sort_by(column);
    }

    if table.is_empty() && format == OutputFormat::Table {
        println!("{}", "No requests recorded yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_timeline_json(table.rows(), table.state())?,
        OutputFormat::Csv => print_timeline_csv(table.rows()),
        OutputFormat::Table => print_timeline_table(table.rows(), table.state(), usize::MAX),
    }
    Ok(())
}

fn print_timeline_table(rows: &[TimelineEntry], state: SortState<TimelineColumn>, max_rows: usize) {
    let header =
        |c: TimelineColumn| sort_header(c.header(), state.active_column() == Some(c), state);
    println!(
        "  {:>4} {:<26} {:<30} {:<7} {:>6} {:>12}",
        header(TimelineColumn::RowNumber),
        header(TimelineColumn::Timestamp),
        header(TimelineColumn::Endpoint),
        header(TimelineColumn::Method),
        header(TimelineColumn::StatusCode),
        header(TimelineColumn::ResponseTime),
    );
    println!("  {}", "-".repeat(90));

    for (i, e) in rows.iter().take(max_rows).enumerate() {
        let status = e.status_code.map_or_else(|| "--".to_string(), |s| s.to_string());
        println!(
            "  {:>4} {:<26} {:<30} {:<7} {:>6} {:>12}",
            i + 1,
            truncate(&e.timestamp, 26),
            truncate(&e.endpoint, 30),
            e.method,
            colorize_status(e.status_code, &status),
            format_ms(e.response_time),
        );
    }
    if rows.len() > max_rows {
        println!("  {}", format!("… {} more", rows.len() - max_rows).dimmed());
    }
}

fn print_timeline_json(rows: &[TimelineEntry], state: SortState<TimelineColumn>) -> Result<()> {
    let value = serde_json::json!({
        "sort": sort_json(state.active_column().map(TimelineColumn::name), state.direction()),
        "requests": rows,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_timeline_csv(rows: &[TimelineEntry]) {
    println!("timestamp,endpoint,method,status_code,response_time");
    for e in rows {
        println!(
            "{},{},{},{},{}",
            csv_field(&e.timestamp),
            csv_field(&e.endpoint),
            csv_field(&e.method),
            csv_number(e.status_code),
            e.response_time.map(|t| t.to_string()).unwrap_or_default(),
        );
    }
}

// ---------------------------------------------------------------------------
// outbreak-dash analytics
// ---------------------------------------------------------------------------

/// Render the three top-N endpoint charts.
pub fn run_analytics(cfg: &DashConfig, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let data = connect(cfg)?.fetch_analytics().context(ANALYTICS_FAILED)?;
    let view = AnalyticsView::from_summary(&data.summary, limit.unwrap_or(cfg.dashboard.top_n));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Csv => print_analytics_csv(&view),
        OutputFormat::Table => {
            println!("{}", "API Usage Analytics".bold().cyan());
            println!("{}", "=".repeat(60));
            println!("  {} {}", "Total requests:".bold(), format_number(Some(view.total_requests)));
            println!("  {} {}", "Recent entries:".bold(), data.timeline.len());
            println!();
            print_analytics_charts(&view);
        }
    }
    Ok(())
}

fn print_analytics_charts(view: &AnalyticsView) {
    println!("{}", "Most Requested Endpoints".bold().cyan());
    let max = view.top_endpoints.iter().map(|e| e.count as f64).fold(0.0, f64::max);
    for e in &view.top_endpoints {
        println!(
            "  {:<28} {:>8} {}",
            truncate(&e.label, 28),
            e.count,
            bar(e.count as f64, max, 30).cyan()
        );
    }
    if view.top_endpoints.is_empty() {
        println!("  {}", "no data".dimmed());
    }
    println!();

    println!("{}", "Slowest Endpoints (avg ms)".bold().cyan());
    let max = view.slowest_endpoints.iter().map(|e| e.avg_ms).fold(0.0, f64::max);
    for e in &view.slowest_endpoints {
        println!(
            "  {:<28} {:>8.2} {}",
            truncate(&e.label, 28),
            e.avg_ms,
            bar(e.avg_ms, max, 30).yellow()
        );
    }
    if view.slowest_endpoints.is_empty() {
        println!("  {}", "no data".dimmed());
    }
    println!();

    println!("{}", "Success vs Error".bold().cyan());
    let max = view.busiest_endpoints.iter().map(|e| e.total() as f64).fold(0.0, f64::max);
    for e in &view.busiest_endpoints {
        let ok = bar(e.success as f64, max, 30);
        let err = bar(e.error as f64, max, 30);
        println!(
            "  {:<28} {:>6}/{:<6} {}{}",
            truncate(&e.label, 28),
            e.success,
            e.error,
            ok.green(),
            err.red()
        );
    }
    if view.busiest_endpoints.is_empty() {
        println!("  {}", "no data".dimmed());
    }
}

fn print_analytics_csv(view: &AnalyticsView) {
    println!("chart,endpoint,value,success,error");
    for e in &view.top_endpoints {
        println!("requests,{},{},,", csv_field(&e.label), e.count);
    }
    for e in &view.slowest_endpoints {
        println!("latency,{},{},,", csv_field(&e.label), e.avg_ms);
    }
    for e in &view.busiest_endpoints {
        println!("outcomes,{},{},{},{}", csv_field(&e.label), e.total(), e.success, e.error);
    }
}

// ---------------------------------------------------------------------------
// outbreak-dash insights | system-insights
// ---------------------------------------------------------------------------

/// Per-country narrative report. With `list`, print the selectable names.
pub fn run_insights(cfg: &DashConfig, country: Option<&str>, list: bool) -> Result<()> {
    let client = connect(cfg)?;

    if list {
        let rows = client.countries().context(COUNTRIES_FAILED)?;
        for name in country::country_names(&rows) {
            println!("{name}");
        }
        return Ok(());
    }

    let name = country
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(cfg.dashboard.default_country.as_str());

    let insights = match client.country_insights(name) {
        Ok(insights) => insights,
        Err(e @ FetchError::CountryNotFound { .. }) => return Err(e.into()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to load AI insights for {name}. Please try again.")));
        }
    };

    print_country_insights(&insights);
    Ok(())
}

fn print_country_insights(ins: &CountryInsights) {
    println!("{}", format!("AI Insights: {}", ins.country).bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "Total cases:    ".bold(), format_number(ins.total_cases));
    println!("  {} {}", "New cases:      ".bold(), format_number(ins.new_cases));
    println!("  {} {}", "Total deaths:   ".bold(), format_number(ins.total_deaths));
    println!("  {} {}", "Recovered:      ".bold(), format_number(ins.total_recovered));
    println!("  {} {}", "Active cases:   ".bold(), format_number(ins.active_cases));
    println!("  {} {:.1}%", "Active share:   ".bold(), ins.active_share_pct());
    println!("  {} {:.3}%", "Daily increase: ".bold(), ins.daily_increase_pct());
    println!();

    if !ins.overall_assessment.is_empty() {
        println!("{}", "Assessment".bold().cyan());
        println!("  {}", ins.overall_assessment);
        println!();
    }

    if !ins.recommendations.is_empty() {
        println!("{}", "Recommendations".bold().cyan());
        for rec in &ins.recommendations {
            println!("  {} {}", "•".cyan(), rec.title.bold());
            println!("    {}", rec.description);
        }
        println!();
    }

    if !ins.targeted_precautions.is_empty() {
        println!("{}", "Targeted Precautions".bold().cyan());
        for group in &ins.targeted_precautions {
            println!("  {}", group.group.bold());
            for tip in &group.tips {
                println!("    - {tip}");
            }
        }
        println!();
    }

    if !ins.generated_at.is_empty() {
        println!("  {}", format!("Generated at {}", ins.generated_at).dimmed());
    }
}

/// System-wide narrative report.
pub fn run_system_insights(cfg: &DashConfig) -> Result<()> {
    let insights = connect(cfg)?
        .system_insights()
        .context("Failed to load AI insights. Please try again.")?;
    print_system_insights(&insights);
    Ok(())
}

fn print_system_insights(ins: &SystemInsights) {
    println!("{}", "AI System Insights".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "Total requests:   ".bold(), format_number(ins.total_requests));
    println!("  {} {}", "Avg response time:".bold(), format_fixed(ins.avg_response_time, 1, " ms"));
    println!("  {} {}", "Error rate:       ".bold(), format_fixed(ins.error_rate, 2, "%"));
    if !ins.slowest_endpoint.is_empty() {
        println!("  {} {}", "Slowest endpoint: ".bold(), ins.slowest_endpoint);
    }
    println!();

    if !ins.overall_assessment.is_empty() {
        println!("{}", "Assessment".bold().cyan());
        println!("  {}", ins.overall_assessment);
        println!();
    }

    if !ins.recommendations.is_empty() {
        println!("{}", "Recommendations".bold().cyan());
        for rec in &ins.recommendations {
            println!("  {} {}", "•".cyan(), rec.title.bold());
            println!("    {}", rec.description);
        }
    }
}

// ---------------------------------------------------------------------------
// outbreak-dash watch
// ---------------------------------------------------------------------------

/// Poll both cycle groups every `interval` seconds and re-render.
///
/// Each tick starts fresh cycles on worker threads without waiting for the
/// previous ones; results come back over a channel and only this thread
/// touches the dashboard. Stops after `cycles` ticks if given.
pub fn run_watch(cfg: &DashConfig, interval: Option<u64>, cycles: Option<u64>) -> Result<()> {
    let client = connect(cfg)?;
    let interval = watch_interval(interval.unwrap_or(cfg.dashboard.refresh_interval_secs));
    let mut dash = Dashboard::new(cfg);
    let (tx, rx) = mpsc::channel();

    tracing::info!(base_url = client.base_url(), ?interval, "watching");

    let mut tick: u64 = 0;
    loop {
        tick += 1;
        for kind in [CycleKind::Overview, CycleKind::Analytics] {
            spawn_cycle(&client, dash.begin_cycle(kind), tx.clone());
        }

        let deadline = Instant::now() + interval;
        let mut shown_notice = dash.notice().is_some();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining.min(Duration::from_secs(1))) {
                Ok((ticket, result)) => {
                    if dash.complete(ticket, result) != CycleOutcome::Stale {
                        render_dashboard(&dash, tick);
                        shown_notice = dash.notice().is_some();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Re-render once a notice has expired.
                    if shown_notice && dash.notice().is_none() {
                        render_dashboard(&dash, tick);
                        shown_notice = false;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if cycles.is_some_and(|n| tick >= n) {
            break;
        }
    }
    Ok(())
}

/// Poll interval clamped to `1..=MAX_WATCH_INTERVAL_SECS` seconds.
fn watch_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(1, MAX_WATCH_INTERVAL_SECS))
}

fn spawn_cycle(client: &ApiClient, ticket: CycleTicket, tx: Sender<(CycleTicket, CycleResult)>) {
    let client = client.clone();
    thread::spawn(move || {
        let result = match ticket.kind {
            CycleKind::Overview => CycleResult::Overview(client.fetch_overview()),
            CycleKind::Analytics => CycleResult::Analytics(client.fetch_analytics()),
        };
        // The receiver is gone once watch returns.
        let _ = tx.send((ticket, result));
    });
}

fn render_dashboard(dash: &Dashboard, tick: u64) {
    if std::io::stdout().is_terminal() {
        print!("\x1B[2J\x1B[H");
    }

    println!(
        "{}  {}",
        "Outbreak Dashboard".bold().cyan(),
        format!("tick {tick}").dimmed()
    );
    println!("{}", "=".repeat(60));

    if let Some(notice) = dash.notice() {
        println!("  {} {}", "✗".red().bold(), notice.message.red());
        println!();
    }

    match dash.global() {
        Some(stats) => print_global_cards(stats),
        None => println!("  {}", "Loading global statistics…".dimmed()),
    }
    println!("  {}", updated_line(dash.last_updated(CycleKind::Overview)).dimmed());
    println!();

    let countries = dash.countries();
    let rows: Vec<&CountryRecord> = countries.rows().iter().collect();
    if !rows.is_empty() {
        println!("{}", "Countries".bold().cyan());
        print_countries_table(&rows, countries.state(), 10);
        println!();
    }

    if let Some(view) = dash.analytics() {
        println!("  {} {}", "Total requests:".bold(), format_number(Some(view.total_requests)));
        println!("  {}", updated_line(dash.last_updated(CycleKind::Analytics)).dimmed());
        println!();
        print_analytics_charts(view);
        println!();
    }

    let timeline = dash.timeline();
    if !timeline.is_empty() {
        println!("{}", "Recent Requests".bold().cyan());
        print_timeline_table(timeline.rows(), timeline.state(), 10);
    }
}

fn updated_line(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => format!(
            "Last updated: {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => "Not loaded yet".to_string(),
    }
}

// ---------------------------------------------------------------------------
// outbreak-dash health
// ---------------------------------------------------------------------------

/// Check config files and backend reachability.
pub fn run_health(cfg: &DashConfig) -> Result<()> {
    println!("{}", "outbreak-dash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.outbreak-dash/config.toml found"
        } else {
            "not found (run `outbreak-dash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".outbreak-dash.toml found"
        } else {
            "none (optional)"
        },
    );

    match ApiClient::from_config(&cfg.api) {
        Ok(client) => {
            let ok = client.is_healthy();
            let detail = if ok {
                format!("reachable at {}", client.base_url())
            } else {
                format!("not reachable at {} (is the API server running?)", client.base_url())
            };
            print_health_item("Backend API", ok, &detail);
        }
        Err(e) => print_health_item("Backend API", false, &e.to_string()),
    }

    print_health_item(
        "Refresh interval",
        true,
        &format!("{}s", cfg.dashboard.refresh_interval_secs),
    );
    print_health_item("Log filter", true, &cfg.logging.level);

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// outbreak-dash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show(cfg: &DashConfig) -> Result<()> {
    let toml_str = config::show_effective_config(cfg)?;
    println!("{}", "Effective outbreak-dash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    let mark = |found: bool| if found { "✓".green() } else { "·".dimmed() };
    let global_label = if global_exists {
        "~/.outbreak-dash/config.toml"
    } else {
        "~/.outbreak-dash/config.toml (not found)"
    };
    let project_label = if project_exists {
        ".outbreak-dash.toml"
    } else {
        ".outbreak-dash.toml (not found)"
    };
    println!("  {} {}", mark(global_exists), global_label.dimmed());
    println!("  {} {}", mark(project_exists), project_label.dimmed());
    println!(
        "  {} {}",
        "·".dimmed(),
        "OUTBREAK_DASH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.outbreak-dash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a count with comma separators; a missing value renders as `--`.
pub fn format_number(n: Option<i64>) -> String {
    let Some(n) = n else {
        return "--".to_string();
    };
    let digits = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

fn format_fixed(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}{suffix}"),
        _ => "--".to_string(),
    }
}

fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v} ms"),
        _ => "--".to_string(),
    }
}

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Column header with an arrow on the active sort column.
fn sort_header<C>(title: &str, active: bool, state: SortState<C>) -> String
where
    C: Copy + Eq,
{
    match (active, state.direction()) {
        (true, Some(SortDirection::Asc)) => format!("{title} ▲"),
        (true, Some(SortDirection::Desc)) => format!("{title} ▼"),
        _ => title.to_string(),
    }
}

fn sort_json(column: Option<&str>, direction: Option<SortDirection>) -> serde_json::Value {
    match (column, direction) {
        (Some(column), Some(direction)) => serde_json::json!({
            "column": column,
            "direction": direction.to_string(),
        }),
        _ => serde_json::Value::Null,
    }
}

/// Horizontal bar scaled so `max` fills `width` cells.
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

fn colorize_status(code: Option<i64>, text: &str) -> colored::ColoredString {
    match code {
        Some(200..=299) => text.green(),
        Some(400..=499) => text.yellow(),
        Some(500..=599) => text.red(),
        _ => text.normal(),
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_number(n: Option<i64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
