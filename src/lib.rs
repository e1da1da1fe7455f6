pub mod analytics;
pub mod cli;
pub mod client;
pub mod config;
pub mod model;
pub mod session;
pub mod table;

use tracing_subscriber::EnvFilter;

/// Initialize diagnostics on stderr.
///
/// `level` is the resolved `[logging] level` (already overridden by
/// `OUTBREAK_DASH_LOG`). An unparseable filter falls back to `warn`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) is a no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
