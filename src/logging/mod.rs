//! Fetch event log: one JSON line per completed backend request.
//!
//! Records every fetch the dashboard performs, successful or not, with its
//! latency and failure class. `pinna-dash log` reads the tail back.
//!
//! Log file: `~/.pinna/fetch-log.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::client::{Endpoint, FetchError};
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// A single fetch event. One line per completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchEvent {
    pub timestamp: String,
    pub endpoint: String,
    /// `"ok"`, `"transport"`, or `"malformed"`.
    pub outcome: String,
    pub latency_ms: u64,
    /// Error message for failed fetches.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl FetchEvent {
    pub fn new(endpoint: Endpoint, error: Option<&FetchError>, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            endpoint: endpoint.path().to_string(),
            outcome: error
                .map(|e| e.kind().to_string())
                .unwrap_or_else(|| "ok".to_string()),
            latency_ms,
            detail: error.map(ToString::to_string),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == "ok"
    }
}

// ---------------------------------------------------------------------------
// Log sink
// ---------------------------------------------------------------------------

/// Where fetch events go. A disabled log drops them.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        if config.enabled {
            Self {
                path: fetch_log_path(),
            }
        } else {
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Log to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event. Best-effort; failures are silently ignored.
    pub fn record(&self, event: &FetchEvent) {
        if let Some(path) = &self.path {
            let _ = append_event(path, event);
        }
    }

    /// The last `n` events, oldest first. Malformed lines are skipped.
    pub fn tail(&self, n: usize) -> Vec<FetchEvent> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let mut events = read_events(path);
        let skip = events.len().saturating_sub(n);
        events.drain(..skip);
        events
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_event(path: &Path, event: &FetchEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

fn read_events(path: &Path) -> Vec<FetchEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<FetchEvent>(&line).ok())
        .collect()
}

/// Return the default path of the fetch log.
pub fn fetch_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pinna").join("fetch-log.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> EventLog {
        let path = std::env::temp_dir()
            .join(format!("pinna-log-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_file(&path);
        EventLog::at(path)
    }

    #[test]
    fn ok_event_has_no_detail() {
        let event = FetchEvent::new(Endpoint::StorageSize, None, 12);
        assert!(event.is_ok());
        assert_eq!(event.endpoint, "/ajax/get/storage-size");
        assert_eq!(event.detail, None);
    }

    #[test]
    fn failed_event_records_kind() {
        let err = FetchError::Malformed {
            endpoint: Endpoint::Statistics.path().to_string(),
            reason: "expected a JSON object".to_string(),
        };
        let event = FetchEvent::new(Endpoint::Statistics, Some(&err), 3);
        assert_eq!(event.outcome, "malformed");
        assert!(event.detail.unwrap().contains("expected a JSON object"));
    }

    #[test]
    fn record_and_tail() {
        let log = temp_log("tail.jsonl");
        for ms in 0..5 {
            log.record(&FetchEvent::new(Endpoint::DocsInCollection, None, ms));
        }
        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].latency_ms, 3);
        assert_eq!(tail[1].latency_ms, 4);
        assert_eq!(log.tail(10).len(), 5);
    }

    #[test]
    fn tail_skips_malformed_lines() {
        let log = temp_log("mixed.jsonl");
        log.record(&FetchEvent::new(Endpoint::Hashtags, None, 1));
        let mut file = OpenOptions::new()
            .append(true)
            .open(log.path().unwrap())
            .unwrap();
        writeln!(file, "{{not json").unwrap();
        log.record(&FetchEvent::new(Endpoint::Hashtags, None, 2));

        let latencies: Vec<_> = log.tail(10).iter().map(|e| e.latency_ms).collect();
        assert_eq!(latencies, [1, 2]);
    }

    #[test]
    fn disabled_log_is_silent() {
        let log = EventLog::disabled();
        log.record(&FetchEvent::new(Endpoint::Hashtags, None, 1));
        assert!(log.tail(10).is_empty());
        assert!(log.path().is_none());
    }
}
