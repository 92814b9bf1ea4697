/// Configuration schema and defaults for pinna-dash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[hashtags]`, `[refresher]`, `[storage]`, `[statistics]`,
/// and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override. A widget section with `enabled = false` is never
/// constructed, which is how a dashboard "registers" its display surfaces.
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::pager::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::refresher::DEFAULT_INTERVAL_MS;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level pinna-dash configuration.
///
/// Maps directly to the `~/.pinna/config.toml` and `.pinna.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub backend: BackendConfig,
    pub hashtags: HashtagsConfig,
    pub refresher: RefresherConfig,
    pub storage: WidgetConfig,
    pub statistics: WidgetConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the JSON endpoints live and how long a request may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Origin of the archiver dashboard, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Transport-level timeout for a single request (milliseconds).
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [hashtags]
// ---------------------------------------------------------------------------

/// Hashtag pager settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashtagsConfig {
    pub enabled: bool,
    /// Items requested per page. Must be greater than zero.
    pub page_size: u64,
    /// Refuse "load more" while a page request is still in flight.
    ///
    /// Set to `false` to allow overlapping page requests whose completions
    /// race, as the original browser widget did.
    pub guard_in_flight: bool,
}

impl Default for HashtagsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
            guard_in_flight: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [refresher]
// ---------------------------------------------------------------------------

/// Metric refresher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefresherConfig {
    pub enabled: bool,
    /// Polling interval for the documents-in-collection counter.
    pub interval_ms: u64,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// [storage] / [statistics]
// ---------------------------------------------------------------------------

/// Toggle for a one-shot widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub enabled: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Fetch event log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSON line per completed fetch to `~/.pinna/fetch-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl DashConfig {
    /// Reject values the dashboard core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            bail!("backend.base_url must not be empty");
        }
        if self.hashtags.page_size == 0 {
            bail!("hashtags.page_size must be greater than zero");
        }
        if self.hashtags.page_size > MAX_PAGE_SIZE {
            bail!("hashtags.page_size must be at most {MAX_PAGE_SIZE}");
        }
        if self.refresher.interval_ms == 0 {
            bail!("refresher.interval_ms must be greater than zero");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The annotated default config written by `pinna-dash config init`.
    pub fn default_toml() -> String {
        r#"# pinna-dash configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Command-line flags (--url)
#   2. Environment variables (PINNA_*)
#   3. Project config (.pinna.toml in current directory)
#   4. User global config (~/.pinna/config.toml)
#   5. Built-in defaults

[backend]
base_url = "http://127.0.0.1:5000"    # PINNA_URL
timeout_ms = 10000                    # PINNA_TIMEOUT_MS

[hashtags]
enabled = true
page_size = 100                       # PINNA_PAGE_SIZE
guard_in_flight = true                # false = allow overlapping "load more"

[refresher]
enabled = true
interval_ms = 30000                   # PINNA_REFRESH_MS

[storage]
enabled = true

[statistics]
enabled = true

[logging]
enabled = true                        # ~/.pinna/fetch-log.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
