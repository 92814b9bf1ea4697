/// The dashboard core: registered widgets, fetch requests, and completions.
///
/// [`Dashboard`] owns every widget's state and never performs I/O. Events
/// (startup, a "load more" command, a timer tick) produce [`FetchRequest`]s;
/// the runtime executes them against a [`Backend`] and hands the resulting
/// [`Completion`]s back through [`Dashboard::apply`], one at a time.
///
/// Only widgets whose surface is registered (see [`Surfaces`]) are
/// constructed. An unregistered widget issues no requests and ignores any
/// stray completion addressed to it.
use std::collections::BTreeMap;
use std::time::Duration;

use crate::client::{
    Backend, DocsReading, Endpoint, FetchError, HashtagCount, HashtagPage, StatisticEntry,
};
use crate::config::DashConfig;
use crate::pager::{HashtagPager, LoadMoreControl, PageRequest};
use crate::refresher::{MetricFields, MetricRefresher};
use crate::widgets::{StatisticsWidget, StorageWidget};

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// Which display surfaces the host registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surfaces {
    pub hashtags: bool,
    pub metrics: bool,
    pub storage: bool,
    pub statistics: bool,
}

impl Surfaces {
    pub fn all() -> Self {
        Self {
            hashtags: true,
            metrics: true,
            storage: true,
            statistics: true,
        }
    }

    pub fn none() -> Self {
        Self {
            hashtags: false,
            metrics: false,
            storage: false,
            statistics: false,
        }
    }

    pub fn from_config(config: &DashConfig) -> Self {
        Self {
            hashtags: config.hashtags.enabled,
            metrics: config.refresher.enabled,
            storage: config.storage.enabled,
            statistics: config.statistics.enabled,
        }
    }
}

/// A dashboard widget, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Widget {
    Hashtags,
    Metrics,
    Storage,
    Statistics,
}

impl std::fmt::Display for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hashtags => "hashtags",
            Self::Metrics => "metrics",
            Self::Storage => "storage",
            Self::Statistics => "statistics",
        };
        f.pad(name)
    }
}

// ---------------------------------------------------------------------------
// Requests and completions
// ---------------------------------------------------------------------------

/// A fetch the runtime should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    HashtagPage(PageRequest),
    HashtagTotal,
    DocsInCollection,
    StorageSize,
    Statistics,
}

impl FetchRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::HashtagPage(_) => Endpoint::Hashtags,
            Self::HashtagTotal => Endpoint::HashtagTotal,
            Self::DocsInCollection => Endpoint::DocsInCollection,
            Self::StorageSize => Endpoint::StorageSize,
            Self::Statistics => Endpoint::Statistics,
        }
    }

    /// Run the request against a backend. Blocks until the backend answers.
    pub fn execute(&self, backend: &dyn Backend) -> Completion {
        match *self {
            Self::HashtagPage(request) => {
                Completion::HashtagPage(request, backend.hashtags(request.from, request.to))
            }
            Self::HashtagTotal => Completion::HashtagTotal(backend.hashtag_total()),
            Self::DocsInCollection => Completion::DocsInCollection(backend.docs_in_collection()),
            Self::StorageSize => Completion::StorageSize(backend.storage_size()),
            Self::Statistics => Completion::Statistics(backend.statistics()),
        }
    }
}

/// The outcome of a [`FetchRequest`].
#[derive(Debug, Clone)]
pub enum Completion {
    HashtagPage(PageRequest, Result<HashtagPage, FetchError>),
    HashtagTotal(Result<u64, FetchError>),
    DocsInCollection(Result<DocsReading, FetchError>),
    StorageSize(Result<serde_json::Number, FetchError>),
    Statistics(Result<Vec<StatisticEntry>, FetchError>),
}

impl Completion {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::HashtagPage(..) => Endpoint::Hashtags,
            Self::HashtagTotal(_) => Endpoint::HashtagTotal,
            Self::DocsInCollection(_) => Endpoint::DocsInCollection,
            Self::StorageSize(_) => Endpoint::StorageSize,
            Self::Statistics(_) => Endpoint::Statistics,
        }
    }

    pub fn widget(&self) -> Widget {
        match self {
            Self::HashtagPage(..) | Self::HashtagTotal(_) => Widget::Hashtags,
            Self::DocsInCollection(_) => Widget::Metrics,
            Self::StorageSize(_) => Widget::Storage,
            Self::Statistics(_) => Widget::Statistics,
        }
    }

    /// The error, if the fetch failed.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::HashtagPage(_, r) => r.as_ref().err(),
            Self::HashtagTotal(r) => r.as_ref().err(),
            Self::DocsInCollection(r) => r.as_ref().err(),
            Self::StorageSize(r) => r.as_ref().err(),
            Self::Statistics(r) => r.as_ref().err(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// All widget state for one dashboard session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pager: Option<HashtagPager>,
    hashtag_total: Option<u64>,
    refresher: Option<MetricRefresher>,
    storage: Option<StorageWidget>,
    statistics: Option<StatisticsWidget>,
    failures: BTreeMap<Widget, FetchError>,
}

impl Dashboard {
    /// Construct the registered widgets with the configured policies.
    pub fn new(config: &DashConfig, surfaces: Surfaces) -> Self {
        Self {
            pager: surfaces.hashtags.then(|| {
                HashtagPager::new(config.hashtags.page_size, config.hashtags.guard_in_flight)
            }),
            hashtag_total: None,
            refresher: surfaces
                .metrics
                .then(|| MetricRefresher::new(config.refresher.interval_ms)),
            storage: surfaces.storage.then(StorageWidget::default),
            statistics: surfaces.statistics.then(StatisticsWidget::default),
            failures: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &DashConfig) -> Self {
        Self::new(config, Surfaces::from_config(config))
    }

    /// The startup requests: first hashtag page (replacing), hashtag total,
    /// storage size, and statistics, each only if registered.
    ///
    /// The refresher is not ticked here; its first tick comes one interval
    /// after startup.
    pub fn start(&mut self) -> Vec<FetchRequest> {
        let mut requests = Vec::new();

        if let Some(pager) = self.pager.as_mut()
            && let Some(request) = pager.begin(true)
        {
            requests.push(FetchRequest::HashtagPage(request));
            requests.push(FetchRequest::HashtagTotal);
        }
        if self.storage.is_some() {
            requests.push(FetchRequest::StorageSize);
        }
        if self.statistics.is_some() {
            requests.push(FetchRequest::Statistics);
        }

        requests
    }

    /// The "load more" command.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        self.pager
            .as_mut()?
            .load_more()
            .map(FetchRequest::HashtagPage)
    }

    /// A refresher timer tick. Ticks are not serialized against each other.
    pub fn tick(&mut self) -> Option<FetchRequest> {
        self.refresher
            .as_ref()
            .map(|_| FetchRequest::DocsInCollection)
    }

    /// How often [`tick`](Self::tick) should fire, if the refresher is registered.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresher
            .as_ref()
            .map(|r| Duration::from_millis(r.interval_ms()))
    }

    /// Apply one completion. Failures are recorded per widget and leave the
    /// displayed values untouched.
    pub fn apply(&mut self, completion: Completion) {
        let widget = completion.widget();
        let failed = completion.error().cloned();

        match completion {
            Completion::HashtagPage(request, result) => {
                if let Some(pager) = self.pager.as_mut() {
                    match result {
                        Ok(page) => pager.complete(&request, page),
                        Err(_) => pager.fail(&request),
                    }
                }
            }
            Completion::HashtagTotal(Ok(total)) => {
                if self.pager.is_some() {
                    self.hashtag_total = Some(total);
                }
            }
            Completion::DocsInCollection(Ok(reading)) => {
                if let Some(refresher) = self.refresher.as_mut() {
                    refresher.apply(reading);
                }
            }
            Completion::StorageSize(Ok(size)) => {
                if let Some(storage) = self.storage.as_mut() {
                    storage.apply(&size);
                }
            }
            Completion::Statistics(Ok(entries)) => {
                if let Some(statistics) = self.statistics.as_mut() {
                    statistics.apply(entries);
                }
            }
            Completion::HashtagTotal(Err(_))
            | Completion::DocsInCollection(Err(_))
            | Completion::StorageSize(Err(_))
            | Completion::Statistics(Err(_)) => {}
        }

        match failed {
            Some(err) => {
                self.failures.insert(widget, err);
            }
            None => {
                self.failures.remove(&widget);
            }
        }
    }

    // -- Accessors --

    pub fn pager(&self) -> Option<&HashtagPager> {
        self.pager.as_ref()
    }

    pub fn hashtags(&self) -> &[HashtagCount] {
        self.pager.as_ref().map(|p| p.entries()).unwrap_or_default()
    }

    pub fn load_more_control(&self) -> Option<LoadMoreControl> {
        self.pager.as_ref().map(HashtagPager::control)
    }

    pub fn hashtag_total(&self) -> Option<u64> {
        self.hashtag_total
    }

    pub fn refresher(&self) -> Option<&MetricRefresher> {
        self.refresher.as_ref()
    }

    pub fn metrics(&self) -> Option<&MetricFields> {
        self.refresher.as_ref().map(MetricRefresher::fields)
    }

    pub fn storage(&self) -> Option<&StorageWidget> {
        self.storage.as_ref()
    }

    pub fn statistics(&self) -> Option<&StatisticsWidget> {
        self.statistics.as_ref()
    }

    /// The most recent unresolved failure per widget.
    pub fn failures(&self) -> &BTreeMap<Widget, FetchError> {
        &self.failures
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
