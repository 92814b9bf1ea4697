//! CLI command implementations for pinna-dash.
//!
//! Provides subcommand handlers for:
//! - `pinna-dash watch`: the live, interactive dashboard
//! - `pinna-dash snapshot`: fetch every widget once and print it
//! - `pinna-dash hashtags`: page through the hashtag list
//! - `pinna-dash check`: probe every backend endpoint
//! - `pinna-dash config show|init`: configuration management
//! - `pinna-dash log`: tail the fetch event log

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::client::{Backend, Endpoint, HttpBackend};
use crate::config::{self, DashConfig};
use crate::dashboard::{Dashboard, FetchRequest, Surfaces};
use crate::logging::EventLog;
use crate::pager::PaginationCursor;
use crate::render;
use crate::runtime::{self, Runtime};

/// Output format for one-shot commands.
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

/// Extra time a one-shot command waits beyond the request timeout.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

fn backend_for(config: &DashConfig) -> Arc<dyn Backend> {
    Arc::new(HttpBackend::from_config(&config.backend))
}

fn drain_timeout(config: &DashConfig) -> Duration {
    Duration::from_millis(config.backend.timeout_ms) + DRAIN_GRACE
}

// ---------------------------------------------------------------------------
// pinna-dash watch
// ---------------------------------------------------------------------------

/// Run the live dashboard until the user quits.
pub fn run_watch(config: &DashConfig) -> Result<()> {
    config.validate()?;

    let mut dashboard = Dashboard::from_config(config);
    let mut runtime = Runtime::new(backend_for(config), EventLog::from_config(&config.logging));
    runtime::spawn_stdin_reader(runtime.sender());

    runtime.run(&mut dashboard, |dash| {
        // Clear screen and home the cursor before each redraw
        println!("\x1b[2J\x1b[H{}", render::render_terminal(dash));
        let _ = std::io::stdout().flush();
    });

    Ok(())
}

// ---------------------------------------------------------------------------
// pinna-dash snapshot
// ---------------------------------------------------------------------------

/// Start every registered widget, run one refresher tick, and print once.
pub fn run_snapshot(config: &DashConfig, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Csv {
        bail!("snapshot supports table or json output, not csv");
    }
    config.validate()?;

    let mut dashboard = Dashboard::from_config(config);
    let mut runtime = Runtime::new(backend_for(config), EventLog::from_config(&config.logging));

    let mut requests = dashboard.start();
    requests.extend(dashboard.tick());
    runtime.dispatch_all(requests);

    if !runtime.drain(&mut dashboard, drain_timeout(config)) {
        eprintln!(
            "{}",
            format!("{} request(s) did not finish in time", runtime.pending()).yellow()
        );
    }

    match format {
        OutputFormat::Json => println!("{}", render::render_json(&dashboard)?),
        OutputFormat::Table | OutputFormat::Csv => {
            println!("{}", render::render_terminal(&dashboard))
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// pinna-dash hashtags
// ---------------------------------------------------------------------------

/// Load hashtag pages until the backend runs out or `max_pages` is reached.
pub fn run_hashtags(config: &DashConfig, max_pages: Option<u32>, format: OutputFormat) -> Result<()> {
    config.validate()?;

    let backend = HttpBackend::from_config(&config.backend);
    let log = EventLog::from_config(&config.logging);
    let surfaces = Surfaces {
        hashtags: true,
        ..Surfaces::none()
    };
    let mut dashboard = Dashboard::new(config, surfaces);

    let pages = load_hashtag_pages(&mut dashboard, &backend, &log, max_pages);

    if let Some(err) = dashboard.failures().values().next() {
        eprintln!("{} {}", "✗".red().bold(), err);
    }

    let entries = dashboard.hashtags();
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "total": dashboard.hashtag_total(),
                "pages": pages,
                "entries": entries,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("hashtag,count");
            for entry in entries {
                println!("{},{}", entry.tag, entry.count);
            }
        }
        OutputFormat::Table => {
            let total = dashboard
                .hashtag_total()
                .map(render::format_number)
                .unwrap_or_else(|| "?".to_string());
            println!(
                "{}",
                format!("Hashtags: {} shown of {} distinct", entries.len(), total)
                    .bold()
                    .cyan()
            );
            println!("{}", "=".repeat(40));
            for (i, entry) in entries.iter().enumerate() {
                let line = format!("  {:<28} {:>10}", format!("#{}", entry.tag), entry.count);
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
    }

    Ok(())
}

/// Drive the pager synchronously. Returns the number of pages requested.
pub fn load_hashtag_pages(
    dashboard: &mut Dashboard,
    backend: &dyn Backend,
    log: &EventLog,
    max_pages: Option<u32>,
) -> u32 {
    let mut pages = 0;
    for request in dashboard.start() {
        if matches!(request, FetchRequest::HashtagPage(_)) {
            pages += 1;
        }
        let completion = runtime::execute_logged(backend, log, request);
        dashboard.apply(completion);
    }

    while max_pages.is_none_or(|max| pages < max) {
        let Some(request) = dashboard.load_more() else {
            break;
        };
        pages += 1;
        let completion = runtime::execute_logged(backend, log, request);
        dashboard.apply(completion);
    }

    pages
}

// ---------------------------------------------------------------------------
// pinna-dash check
// ---------------------------------------------------------------------------

/// Probe every endpoint once and report reachability and payload shape.
pub fn run_check(config: &DashConfig) -> Result<()> {
    println!("{}", "Backend Check".bold().cyan());
    println!("{}", "=".repeat(50));

    let valid = config.validate();
    print_check_item(
        "Config",
        valid.is_ok(),
        &match &valid {
            Ok(()) => "valid".to_string(),
            Err(e) => e.to_string(),
        },
    );
    valid?;

    let backend = HttpBackend::from_config(&config.backend);
    print_check_item("Backend", true, backend.base_url());

    let log = EventLog::from_config(&config.logging);
    let first_page = PaginationCursor::new(config.hashtags.page_size).next_request(true);
    let mut failures = 0;

    for endpoint in Endpoint::ALL {
        let request = match endpoint {
            Endpoint::Hashtags => FetchRequest::HashtagPage(first_page),
            Endpoint::HashtagTotal => FetchRequest::HashtagTotal,
            Endpoint::DocsInCollection => FetchRequest::DocsInCollection,
            Endpoint::StorageSize => FetchRequest::StorageSize,
            Endpoint::Statistics => FetchRequest::Statistics,
        };

        let start = Instant::now();
        let completion = runtime::execute_logged(&backend, &log, request);
        let latency = start.elapsed().as_millis();

        match completion.error() {
            None => print_check_item(endpoint.path(), true, &format!("ok ({latency} ms)")),
            Some(err) => {
                failures += 1;
                print_check_item(endpoint.path(), false, &format!("{}: {err}", err.kind()));
            }
        }
    }

    println!();
    if failures == 0 {
        println!("  {}", "All endpoints answered as expected.".green());
    } else {
        println!(
            "  {}",
            format!("{failures} endpoint(s) failed; affected widgets will stay empty.").yellow()
        );
    }

    Ok(())
}

fn print_check_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<32} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// pinna-dash config show | init
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show(config: &DashConfig) -> Result<()> {
    let toml_str = config::to_toml(config)?;
    println!("{}", "Effective pinna-dash Configuration".bold().cyan());
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
    print_source("~/.pinna/config.toml", global_exists);
    print_source(".pinna.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "PINNA_* environment variables".dimmed()
    );
    println!("  {} {}", "·".dimmed(), "--url flag".dimmed());

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.pinna/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// pinna-dash log
// ---------------------------------------------------------------------------

/// Print the last `tail` fetch events.
pub fn run_log(config: &DashConfig, tail: usize) -> Result<()> {
    if !config.logging.enabled {
        println!("{}", "Fetch logging is disabled (logging.enabled = false).".yellow());
        return Ok(());
    }

    let log = EventLog::from_config(&config.logging);
    let path = log.path().context("could not determine home directory")?;
    let events = log.tail(tail);

    if events.is_empty() {
        println!(
            "{}",
            format!("No fetch events yet in {}.", path.display()).yellow()
        );
        return Ok(());
    }

    for event in events {
        let outcome = if event.is_ok() {
            event.outcome.green()
        } else {
            event.outcome.red()
        };
        println!(
            "{} {:<30} {:<10} {:>6} ms {}",
            event.timestamp.dimmed(),
            event.endpoint,
            outcome,
            event.latency_ms,
            event.detail.as_deref().unwrap_or("").dimmed(),
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn snapshot_rejects_csv() {
        let err = run_snapshot(&DashConfig::default(), OutputFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("csv"));
    }

    #[test]
    fn drain_timeout_adds_grace() {
        let config = DashConfig::default();
        assert_eq!(drain_timeout(&config), Duration::from_millis(11_000));
    }
}
