//! Terminal and JSON rendering of a [`Dashboard`].
//!
//! The terminal view stands in for the dashboard page: one section per
//! registered widget, the hashtag list as `#tag count` pairs, and the
//! "load more" control as a hint line when visible.

use colored::Colorize;
use serde::Serialize;

use crate::client::{HashtagCount, StatisticEntry};
use crate::dashboard::Dashboard;
use crate::pager::LoadMoreControl;
use crate::refresher::MetricFields;

/// Hashtags shown per row in the terminal view.
const HASHTAGS_PER_ROW: usize = 4;

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Render the whole dashboard as colored terminal text.
pub fn render_terminal(dashboard: &Dashboard) -> String {
    let mut out = Vec::new();

    out.push(format!("{}", "Archive Dashboard".bold().cyan()));
    out.push("=".repeat(60));

    if let Some(metrics) = dashboard.metrics() {
        out.push(String::new());
        out.extend(metric_lines(metrics));
    }

    if let Some(storage) = dashboard.storage() {
        out.push(String::new());
        out.push(format!(
            "  {} {}",
            "Media storage:".bold(),
            storage.display().unwrap_or("…")
        ));
    }

    if let Some(statistics) = dashboard.statistics() {
        out.push(String::new());
        out.push(format!("{}", "Statistics".bold().cyan()));
        match statistics.entries() {
            Some(entries) => out.extend(statistic_lines(entries)),
            None => out.push(format!("  {}", "loading …".dimmed())),
        }
    }

    if let Some(control) = dashboard.load_more_control() {
        out.push(String::new());
        let total = dashboard
            .hashtag_total()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "…".to_string());
        out.push(format!(
            "{} {}",
            "Hashtags".bold().cyan(),
            format!("({total} distinct)").dimmed()
        ));
        out.extend(hashtag_lines(dashboard.hashtags()));
        if let Some(hint) = load_more_hint(control) {
            out.push(format!("  {}", hint.dimmed()));
        }
    }

    if !dashboard.failures().is_empty() {
        out.push(String::new());
        for (widget, err) in dashboard.failures() {
            out.push(format!("  {} {:<11} {}", "✗".red().bold(), widget, err));
        }
    }

    out.join("\n")
}

fn metric_lines(metrics: &MetricFields) -> Vec<String> {
    let docs = metrics
        .docs_in_collection
        .map(format_number)
        .unwrap_or_else(|| "…".to_string());
    let secondary = metrics
        .secondary
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "…".to_string());
    let rate = match metrics.rate_per_hour {
        Some(rate) if rate < 0 => format!("{rate}").red().to_string(),
        Some(rate) => format!("{rate}").green().to_string(),
        None => "…".to_string(),
    };

    vec![
        format!("  {} {}", "Documents in collection:".bold(), docs),
        format!("  {} {}", "Last entry:             ".bold(), secondary),
        format!("  {} {} / hour", "Estimated rate:         ".bold(), rate),
    ]
}

fn statistic_lines(entries: &[StatisticEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| format!("  • {}: {}", e.label, e.value.italic()))
        .collect()
}

fn hashtag_lines(entries: &[HashtagCount]) -> Vec<String> {
    entries
        .chunks(HASHTAGS_PER_ROW)
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|e| format!("{:<24}", hashtag_label(e)))
                .collect();
            format!("  {}", cells.join(" ").trim_end())
        })
        .collect()
}

/// The control's hint line, or `None` when hidden.
pub fn load_more_hint(control: LoadMoreControl) -> Option<String> {
    if !control.visible {
        return None;
    }
    Some(if control.loading {
        control.label().to_string()
    } else {
        format!("[{}] press Enter or `m`, `q` to quit", control.label())
    })
}

// ---------------------------------------------------------------------------
// Plain text helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// A hashtag as the page shows it: `#tag count`.
pub fn hashtag_label(entry: &HashtagCount) -> String {
    format!("#{} {}", entry.tag, entry.count)
}

// ---------------------------------------------------------------------------
// JSON snapshot
// ---------------------------------------------------------------------------

/// Serializable view of every registered widget.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<HashtagSnapshot<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<&'a MetricFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<&'a [StatisticEntry]>,
    pub failures: Vec<FailureSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct HashtagSnapshot<'a> {
    pub total: Option<u64>,
    pub loaded: u64,
    pub entries: &'a [HashtagCount],
    pub load_more: LoadMoreControl,
}

#[derive(Debug, Serialize)]
pub struct FailureSnapshot {
    pub widget: String,
    pub kind: String,
    pub message: String,
}

impl<'a> Snapshot<'a> {
    pub fn of(dashboard: &'a Dashboard) -> Self {
        Self {
            hashtags: dashboard.pager().map(|pager| HashtagSnapshot {
                total: dashboard.hashtag_total(),
                loaded: pager.cursor().loaded(),
                entries: pager.entries(),
                load_more: pager.control(),
            }),
            metrics: dashboard.metrics(),
            storage_size: dashboard.storage().and_then(|s| s.display()),
            statistics: dashboard.statistics().and_then(|s| s.entries()),
            failures: dashboard
                .failures()
                .iter()
                .map(|(widget, err)| FailureSnapshot {
                    widget: widget.to_string(),
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                })
                .collect(),
        }
    }
}

/// Render the dashboard as pretty JSON.
pub fn render_json(dashboard: &Dashboard) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&Snapshot::of(dashboard))?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{CounterValue, DocsReading, HashtagPage};
    use crate::config::DashConfig;
    use crate::dashboard::{Completion, FetchRequest, Surfaces};

    fn loaded_dashboard() -> Dashboard {
        colored::control::set_override(false);
        let mut dash = Dashboard::new(&DashConfig::default(), Surfaces::all());
        let requests = dash.start();
        let FetchRequest::HashtagPage(first) = requests[0] else {
            panic!("expected a hashtag page request");
        };
        dash.apply(Completion::HashtagPage(
            first,
            Ok(HashtagPage::new(vec![
                HashtagCount::new("rust", 3),
                HashtagCount::new("python", 10),
            ])),
        ));
        dash.apply(Completion::HashtagTotal(Ok(2)));
        dash.apply(Completion::StorageSize(Ok(64u64.into())));
        dash.apply(Completion::Statistics(Ok(vec![StatisticEntry {
            label: "Tweets".to_string(),
            value: "12".to_string(),
        }])));
        dash.apply(Completion::DocsInCollection(Ok(DocsReading {
            secondary: CounterValue::Text("yesterday".to_string()),
            primary: 1_234_567,
        })));
        dash
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn hashtag_label_format() {
        assert_eq!(hashtag_label(&HashtagCount::new("rust", 7)), "#rust 7");
    }

    #[test]
    fn hashtag_rows_hold_four_labels() {
        let entries: Vec<_> = (0..5)
            .map(|i| HashtagCount::new(format!("t{i}"), 10 - i))
            .collect();
        let lines = hashtag_lines(&entries);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  #t0 10"));
        assert!(lines[0].trim_end().ends_with("#t3 7"));
        assert_eq!(lines[1], format!("  {}", hashtag_label(&entries[4])));
    }

    #[test]
    fn hint_hidden_when_control_hidden() {
        assert_eq!(load_more_hint(LoadMoreControl::default()), None);
        let visible = LoadMoreControl {
            visible: true,
            loading: false,
        };
        assert!(load_more_hint(visible).unwrap().starts_with("[Load More]"));
    }

    #[test]
    fn terminal_view_lists_sorted_hashtags() {
        let text = render_terminal(&loaded_dashboard());
        let python = text.find("#python 10").unwrap();
        let rust = text.find("#rust 3").unwrap();
        assert!(python < rust);
        assert!(text.contains("64 MB"));
        assert!(text.contains("Tweets: 12"));
        assert!(text.contains("1,234,567"));
        assert!(text.contains("yesterday"));
        // Short page: no "load more" hint
        assert!(!text.contains("Load More"));
    }

    #[test]
    fn json_snapshot_shape() {
        let dash = loaded_dashboard();
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&dash).unwrap()).unwrap();
        assert_eq!(json["hashtags"]["loaded"], 100);
        assert_eq!(json["hashtags"]["total"], 2);
        assert_eq!(json["hashtags"]["entries"][0]["tag"], "python");
        assert_eq!(json["hashtags"]["load_more"]["visible"], false);
        assert_eq!(json["metrics"]["docs_in_collection"], 1_234_567);
        assert_eq!(json["metrics"]["rate_per_hour"], serde_json::Value::Null);
        assert_eq!(json["storage_size"], "64 MB");
        assert_eq!(json["statistics"][0]["label"], "Tweets");
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
