//! Endpoint table and JSON payload shapes.
//!
//! Parsing is kept apart from the HTTP layer so that malformed bodies can be
//! exercised without a server. Each parser returns a short reason string on
//! failure; the client wraps it into [`FetchError::Malformed`](super::FetchError).

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// The JSON endpoints the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Hashtags,
    HashtagTotal,
    DocsInCollection,
    StorageSize,
    Statistics,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Hashtags,
        Endpoint::HashtagTotal,
        Endpoint::DocsInCollection,
        Endpoint::StorageSize,
        Endpoint::Statistics,
    ];

    /// Path relative to the backend origin.
    pub fn path(self) -> &'static str {
        match self {
            Self::Hashtags => "/ajax/get/hashtags",
            Self::HashtagTotal => "/ajax/get/hashtags-number",
            Self::DocsInCollection => "/ajax/get/docs-in-collection",
            Self::StorageSize => "/ajax/get/storage-size",
            Self::Statistics => "/ajax/get/statistics",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// One hashtag and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashtagCount {
    pub tag: String,
    pub count: u64,
}

impl HashtagCount {
    pub fn new(tag: impl Into<String>, count: u64) -> Self {
        Self {
            tag: tag.into(),
            count,
        }
    }
}

/// A page of hashtag counts in the order the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashtagPage {
    pub entries: Vec<HashtagCount>,
}

impl HashtagPage {
    pub fn new(entries: Vec<HashtagCount>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A counter the backend reports verbatim.
///
/// The reference backend puts the last-entry timestamp in the secondary slot
/// of the docs-in-collection reading, or `0` for an empty collection, so both
/// numbers and strings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CounterValue {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for CounterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The two-element `[secondary, primary]` docs-in-collection reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocsReading {
    pub secondary: CounterValue,
    /// Documents in the collection.
    pub primary: u64,
}

/// One `label: value` line of the statistics widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticEntry {
    pub label: String,
    pub value: String,
}

impl std::fmt::Display for StatisticEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

fn parse_json(body: &str) -> Result<Value, String> {
    serde_json::from_str(body).map_err(|e| format!("invalid JSON: {e}"))
}

/// Parse `{"tag": count, ...}` keeping backend key order.
pub fn parse_hashtag_page(body: &str) -> Result<HashtagPage, String> {
    let Value::Object(map) = parse_json(body)? else {
        return Err("expected a JSON object of hashtag counts".to_string());
    };

    let entries = map
        .into_iter()
        .map(|(tag, count)| {
            count
                .as_u64()
                .map(|count| HashtagCount { tag: tag.clone(), count })
                .ok_or_else(|| format!("count for '{tag}' is not a non-negative integer"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HashtagPage { entries })
}

/// Parse a bare non-negative integer (the hashtag total).
pub fn parse_count(body: &str) -> Result<u64, String> {
    parse_json(body)?
        .as_u64()
        .ok_or_else(|| "expected a non-negative integer".to_string())
}

/// Parse a bare number (the storage size in MB).
pub fn parse_number(body: &str) -> Result<serde_json::Number, String> {
    match parse_json(body)? {
        Value::Number(n) => Ok(n),
        _ => Err("expected a number".to_string()),
    }
}

/// Parse the `[secondary, primary]` reading.
pub fn parse_docs_reading(body: &str) -> Result<DocsReading, String> {
    let Value::Array(items) = parse_json(body)? else {
        return Err("expected a two-element array".to_string());
    };
    let [secondary, primary] = <[Value; 2]>::try_from(items)
        .map_err(|items| format!("expected two elements, got {}", items.len()))?;

    let secondary = match secondary {
        Value::Number(n) => CounterValue::Number(n),
        Value::String(s) => CounterValue::Text(s),
        other => return Err(format!("secondary counter has unexpected type: {other}")),
    };
    let primary = primary
        .as_u64()
        .ok_or_else(|| "primary counter is not a non-negative integer".to_string())?;

    Ok(DocsReading { secondary, primary })
}

/// Parse `{"key": [label, value], ...}` keeping backend key order.
pub fn parse_statistics(body: &str) -> Result<Vec<StatisticEntry>, String> {
    let Value::Object(map) = parse_json(body)? else {
        return Err("expected a JSON object of statistics".to_string());
    };

    map.into_iter()
        .map(|(key, pair)| match pair {
            Value::Array(items) if items.len() == 2 => Ok(StatisticEntry {
                label: display_scalar(&items[0]),
                value: display_scalar(&items[1]),
            }),
            _ => Err(format!("statistic '{key}' is not a [label, value] pair")),
        })
        .collect()
}

/// Render a JSON value the way a page would insert it as text.
fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
