/// Configuration system for pinna-dash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config**: `~/.pinna/config.toml`
/// 3. **Project local config**: `.pinna.toml` in the current working directory
/// 4. **Environment variables**: `PINNA_*` overrides
///
/// Command-line flags are applied on top by the CLI layer.
///
/// File layers are merged key by key: a project file that only sets
/// `hashtags.page_size` keeps every other value from the global file.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Files that are not valid TOML, or that hold values of the wrong type,
/// are skipped without affecting the other layers.
pub fn load() -> DashConfig {
    let files = [global_config_path(), project_config_path()];
    let mut config = load_layers(files.iter().flatten().map(PathBuf::as_path));
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the built-in defaults, in order.
pub fn load_layers<'a>(paths: impl IntoIterator<Item = &'a Path>) -> DashConfig {
    let mut merged = match toml::Value::try_from(DashConfig::default()) {
        Ok(value) => value,
        Err(_) => return DashConfig::default(),
    };

    for path in paths {
        let Some(layer) = load_toml_value(path) else {
            continue;
        };
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        // A layer with a wrong-typed value is skipped on its own
        let typed: Result<DashConfig, _> = candidate.clone().try_into();
        if typed.is_ok() {
            merged = candidate;
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read a TOML file as an untyped value.
///
/// Returns `None` if the file doesn't exist, can't be read, or is not valid
/// TOML.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively overlay `overlay` onto `base`.
///
/// Tables merge key by key; any other value replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
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

/// Path to the user global config: `~/.pinna/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pinna").join("config.toml"))
}

/// Path to the project local config: `.pinna.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".pinna.toml"))
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

/// Apply environment variable overrides.
///
/// Supported variables:
/// - `PINNA_URL`: backend origin
/// - `PINNA_TIMEOUT_MS`: request timeout
/// - `PINNA_PAGE_SIZE`: hashtag page size
/// - `PINNA_REFRESH_MS`: refresher interval
/// - `PINNA_GUARD_IN_FLIGHT`: in-flight guard for "load more" (`1`/`true`/`yes`/`on`)
/// - `PINNA_LOG`: fetch event log switch
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("PINNA_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("PINNA_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("PINNA_PAGE_SIZE")
        && let Ok(size) = val.parse::<u64>()
    {
        config.hashtags.page_size = size;
    }
    if let Ok(val) = std::env::var("PINNA_REFRESH_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.refresher.interval_ms = ms;
    }
    if let Ok(val) = std::env::var("PINNA_GUARD_IN_FLIGHT") {
        config.hashtags.guard_in_flight = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PINNA_LOG") {
        config.logging.enabled = is_truthy(&val);
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
// Config init / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.pinna/config.toml`.
///
/// Returns an error if the file already exists and `force` is not set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.pinna/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Serialize a resolved config as TOML for display.
pub fn to_toml(config: &DashConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
