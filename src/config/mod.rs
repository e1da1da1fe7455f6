/// Configuration system for outbreak-dash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config**: `~/.outbreak-dash/config.toml`
/// 3. **Project local config**: `.outbreak-dash.toml` in the current directory
/// 4. **Environment variables**: `OUTBREAK_DASH_*` overrides (highest precedence)
///
/// File layers are merged key by key: a project file that only sets
/// `api.base_url` keeps every other value from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use outbreak_dash::config;
///
/// let cfg = config::load();
/// let client = ApiClient::from_config(&cfg.api)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> DashConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_file(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: DashConfig = merged.try_into().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config files do not match the schema, using defaults");
        DashConfig::default()
    });

    apply_env_overrides(&mut config);
    config
}

/// Read a TOML file as an untyped value.
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file never stops the dashboard.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Merge `overlay` into `base`, recursing into tables. Non-table values in
/// the overlay replace those in the base.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.outbreak-dash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".outbreak-dash").join("config.toml"))
}

/// Path to the project local config: `.outbreak-dash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".outbreak-dash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `OUTBREAK_DASH_API_URL`: backend base URL
/// - `OUTBREAK_DASH_TIMEOUT_MS`: per-request timeout
/// - `OUTBREAK_DASH_TOP_N`: endpoints per analytics chart
/// - `OUTBREAK_DASH_REFRESH_SECS`: `watch` poll interval
/// - `OUTBREAK_DASH_LOG`: diagnostic log filter
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("OUTBREAK_DASH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("OUTBREAK_DASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("OUTBREAK_DASH_TOP_N")
        && let Ok(n) = val.parse::<usize>()
    {
        config.dashboard.top_n = n;
    }
    if let Ok(val) = std::env::var("OUTBREAK_DASH_REFRESH_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.dashboard.refresh_interval_secs = secs;
    }
    if let Ok(val) = std::env::var("OUTBREAK_DASH_LOG")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.outbreak-dash/config.toml`.
///
/// Returns an error if the file already exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.outbreak-dash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `api.base_url`. The new value is parsed to the
/// type of the current (or default) value at that key.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(DashConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    // Reject edits that would make the file unreadable by `load`.
    let _: DashConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// Missing sections or keys that exist in the schema defaults are created.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let defaults = toml::Value::try_from(DashConfig::default())
        .context("failed to serialize default config")?;

    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key '{key}'");
    }

    let mut template = Some(&defaults);
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        template = template.and_then(|t| t.get(part));
        let table = current
            .as_table_mut()
            .with_context(|| format!("config key '{key}' does not name a section"))?;
        if !table.contains_key(part) {
            if template.is_none() {
                anyhow::bail!("config key not found: section '{part}' in '{key}'");
            }
            table.insert(part.to_string(), toml::Value::Table(toml::map::Map::new()));
        }
        current = table
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let existing = table
        .get(leaf)
        .cloned()
        .or_else(|| template.and_then(|t| t.get(leaf)).cloned())
        .with_context(|| format!("unknown config key '{key}'"))?;

    let new_value = match existing {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Render a resolved config (normally the result of [`load`]) as TOML.
pub fn show_effective_config(config: &DashConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn merge_keeps_untouched_keys() {
        let mut base: toml::Value = toml::from_str(
            r#"
[api]
base_url = "http://global/api"
timeout_ms = 500

[dashboard]
top_n = 3
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[api]
base_url = "http://project/api"
"#,
        )
        .unwrap();

        merge_values(&mut base, overlay);
        let config: DashConfig = base.try_into().unwrap();
        assert_eq!(config.api.base_url, "http://project/api");
        assert_eq!(config.api.timeout_ms, 500);
        assert_eq!(config.dashboard.top_n, 3);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str(
            r#"
[api]
base_url = "http://a/api"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "api.base_url", "http://b/api").unwrap();
        assert_eq!(root["api"]["base_url"].as_str(), Some("http://b/api"));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let mut root: toml::Value = toml::from_str(
            r#"
[tables]
countries_reset_on_reload = false
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "tables.countries_reset_on_reload", "yes").unwrap();
        assert_eq!(root["tables"]["countries_reset_on_reload"].as_bool(), Some(true));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str("[dashboard]\ntop_n = 5\n").unwrap();
        set_toml_value(&mut root, "dashboard.top_n", "8").unwrap();
        assert_eq!(root["dashboard"]["top_n"].as_integer(), Some(8));

        let result = set_toml_value(&mut root, "dashboard.top_n", "eight");
        assert!(result.is_err());
    }

    #[test]
    fn set_toml_value_creates_missing_section_from_schema() {
        let mut root = toml::Value::Table(toml::map::Map::new());
        set_toml_value(&mut root, "logging.level", "debug").unwrap();
        assert_eq!(root["logging"]["level"].as_str(), Some("debug"));

        set_toml_value(&mut root, "api.timeout_ms", "250").unwrap();
        assert_eq!(root["api"]["timeout_ms"].as_integer(), Some(250));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root = toml::Value::Table(toml::map::Map::new());
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "api.nope", "value").is_err());
        assert!(set_toml_value(&mut root, "api..base_url", "value").is_err());
    }

    #[test]
    fn show_effective_config_renders_the_given_config() {
        let mut config = DashConfig::default();
        config.api.base_url = "http://dash.internal:9000/api".to_string();
        config.dashboard.top_n = 8;

        let toml_str = show_effective_config(&config).unwrap();
        let parsed: DashConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api.base_url, "http://dash.internal:9000/api");
        assert_eq!(parsed.dashboard.top_n, 8);
    }
}
