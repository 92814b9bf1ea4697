//! One-shot pass-through widgets: storage size, statistics, hashtag total.
//!
//! Each is fetched once at startup and only rendered; none keeps state beyond
//! the last value it received.

use crate::client::StatisticEntry;

/// Format the storage size the way the dashboard shows it.
pub fn format_storage_size(megabytes: &serde_json::Number) -> String {
    format!("{megabytes} MB")
}

/// Storage size widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageWidget {
    display: Option<String>,
}

impl StorageWidget {
    pub fn apply(&mut self, megabytes: &serde_json::Number) {
        self.display = Some(format_storage_size(megabytes));
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }
}

/// Statistics list widget. Keeps backend order, never sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsWidget {
    entries: Option<Vec<StatisticEntry>>,
}

impl StatisticsWidget {
    /// Replace the list with a fresh response.
    pub fn apply(&mut self, entries: Vec<StatisticEntry>) {
        self.entries = Some(entries);
    }

    /// `None` until the first response arrives.
    pub fn entries(&self) -> Option<&[StatisticEntry]> {
        self.entries.as_deref()
    }

    /// One `label: value` line per entry.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .flatten()
            .map(ToString::to_string)
            .collect()
    }
}
