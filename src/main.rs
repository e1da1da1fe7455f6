use anyhow::Result;
use clap::{Parser, Subcommand};

use outbreak_dash::{cli, config};

#[derive(Debug, Parser)]
#[command(name = "outbreak-dash")]
#[command(about = "Terminal dashboard for outbreak statistics and API usage analytics")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show global case totals
    Global,
    /// Show the per-country table
    Countries {
        /// Sort by a column (name or index); repeat to click again
        #[arg(long = "sort", value_name = "COLUMN")]
        sorts: Vec<String>,
        /// Only show countries whose name contains this text
        #[arg(long)]
        search: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show recent API requests, newest first
    Timeline {
        /// Sort by a column (name or index); repeat to click again
        #[arg(long = "sort", value_name = "COLUMN")]
        sorts: Vec<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the top endpoints by requests, latency and outcomes
    Analytics {
        /// Endpoints per chart (default: dashboard.top_n)
        #[arg(long)]
        limit: Option<usize>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the AI insights report for one country
    Insights {
        /// Country name (default: dashboard.default_country)
        #[arg(long)]
        country: Option<String>,
        /// List the available country names instead
        #[arg(long)]
        list: bool,
    },
    /// Show the AI insights report for the API itself
    SystemInsights,
    /// Poll the backend and redraw the dashboard
    Watch {
        /// Seconds between polls (default: dashboard.refresh_interval_secs)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many polls
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Check config files and backend reachability
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.outbreak-dash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value in the global config (e.g. `api.base_url http://host/api`)
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    outbreak_dash::init_tracing(&cfg.logging.level);

    match app.command {
        Commands::Global => cli::run_global(&cfg),
        Commands::Countries {
            sorts,
            search,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_countries(&cfg, &sorts, search.as_deref(), fmt)
        }
        Commands::Timeline { sorts, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_timeline(&cfg, &sorts, fmt)
        }
        Commands::Analytics { limit, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_analytics(&cfg, limit, fmt)
        }
        Commands::Insights { country, list } => cli::run_insights(&cfg, country.as_deref(), list),
        Commands::SystemInsights => cli::run_system_insights(&cfg),
        Commands::Watch { interval, cycles } => cli::run_watch(&cfg, interval, cycles),
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(&cfg),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
