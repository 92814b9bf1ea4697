/// Backend client for the archiver's JSON endpoints.
///
/// Talks to the dashboard backend using the synchronous `ureq` HTTP client.
/// Every endpoint is a plain `GET` returning a small JSON document; see
/// [`payload::Endpoint`] for the table.
///
/// The [`Backend`] trait is the seam the dashboard core depends on, so the
/// pager and refresher can be driven by a scripted backend in tests.
use std::time::Duration;

mod error;
pub mod payload;

pub use error::{FailureKind, FetchError};
pub use payload::{
    CounterValue, DocsReading, Endpoint, HashtagCount, HashtagPage, StatisticEntry,
};

use crate::config::schema::BackendConfig;

/// The backend operations the dashboard consumes.
///
/// Implementations must be shareable across the worker threads that run
/// individual fetches.
pub trait Backend: Send + Sync {
    /// Hashtag counts for the half-open range `[from, to)`.
    fn hashtags(&self, from: u64, to: u64) -> Result<HashtagPage, FetchError>;

    /// Total number of distinct hashtags.
    fn hashtag_total(&self) -> Result<u64, FetchError>;

    /// The `[secondary, primary]` docs-in-collection reading.
    fn docs_in_collection(&self) -> Result<DocsReading, FetchError>;

    /// Media storage size in MB.
    fn storage_size(&self) -> Result<serde_json::Number, FetchError>;

    /// Statistics entries in backend order.
    fn statistics(&self) -> Result<Vec<StatisticEntry>, FetchError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Synchronous HTTP backend.
///
/// Holds a single `ureq::Agent` so that connections are pooled across the
/// lifetime of a dashboard session.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Build a backend from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Issue a GET and return the response body.
    fn get(&self, endpoint: Endpoint, query: &[(&str, String)]) -> Result<String, FetchError> {
        let mut request = self.agent.get(&self.url(endpoint)).timeout(self.timeout);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    endpoint: endpoint.path().to_string(),
                    status,
                });
            }
            Err(err) => {
                return Err(FetchError::Transport {
                    endpoint: endpoint.path().to_string(),
                    reason: err.to_string(),
                });
            }
        };

        response.into_string().map_err(|e| FetchError::Transport {
            endpoint: endpoint.path().to_string(),
            reason: format!("failed to read body: {e}"),
        })
    }

    /// GET an endpoint and run its payload parser.
    fn fetch<T>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, String)],
        parse: fn(&str) -> Result<T, String>,
    ) -> Result<T, FetchError> {
        let body = self.get(endpoint, query)?;
        parse(&body).map_err(|reason| FetchError::Malformed {
            endpoint: endpoint.path().to_string(),
            reason,
        })
    }
}

impl Backend for HttpBackend {
    fn hashtags(&self, from: u64, to: u64) -> Result<HashtagPage, FetchError> {
        self.fetch(
            Endpoint::Hashtags,
            &[("f", from.to_string()), ("t", to.to_string())],
            payload::parse_hashtag_page,
        )
    }

    fn hashtag_total(&self) -> Result<u64, FetchError> {
        self.fetch(Endpoint::HashtagTotal, &[], payload::parse_count)
    }

    fn docs_in_collection(&self) -> Result<DocsReading, FetchError> {
        self.fetch(Endpoint::DocsInCollection, &[], payload::parse_docs_reading)
    }

    fn storage_size(&self) -> Result<serde_json::Number, FetchError> {
        self.fetch(Endpoint::StorageSize, &[], payload::parse_number)
    }

    fn statistics(&self) -> Result<Vec<StatisticEntry>, FetchError> {
        self.fetch(Endpoint::Statistics, &[], payload::parse_statistics)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
