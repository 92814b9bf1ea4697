/// Incremental hashtag pagination.
///
/// The pager owns a [`PaginationCursor`], the list of hashtags displayed so
/// far, and the state of the "load more" control. Loading a page is split
/// into [`HashtagPager::begin`], which produces the request to send, and
/// [`HashtagPager::complete`] / [`HashtagPager::fail`], which apply its
/// outcome. The pager itself never performs I/O.
///
/// # End detection
///
/// A page with fewer entries than `page_size` (including an empty page) is
/// taken to mean the backend has nothing more. A full last page therefore
/// costs one extra request that comes back empty.
use serde::Serialize;

use crate::client::{HashtagCount, HashtagPage};

/// Items requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Largest page size the configuration accepts.
pub const MAX_PAGE_SIZE: u64 = 10_000;

/// A page shorter than the requested size ends pagination.
pub const SHORT_PAGE_ENDS_PAGINATION: bool = true;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// How far pagination has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    loaded: u64,
    page_size: u64,
}

impl PaginationCursor {
    /// A cursor at the start. `page_size` is clamped to at least 1.
    pub fn new(page_size: u64) -> Self {
        Self {
            loaded: 0,
            page_size: page_size.max(1),
        }
    }

    /// Items requested so far across all completed pages.
    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// The request for the next page from the current position.
    pub fn next_request(&self, replace: bool) -> PageRequest {
        PageRequest {
            from: self.loaded,
            to: self.loaded.saturating_add(self.page_size),
            replace,
        }
    }

    /// Move past a completed request, independent of how many items it
    /// actually returned.
    pub fn advance_past(&mut self, request: &PageRequest) {
        self.loaded = request.from.saturating_add(self.page_size);
    }
}

/// One page request for the half-open range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub from: u64,
    pub to: u64,
    /// Clear the displayed list before appending this page.
    pub replace: bool,
}

// ---------------------------------------------------------------------------
// "Load more" control
// ---------------------------------------------------------------------------

/// Visibility and label state of the "load more" control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadMoreControl {
    pub visible: bool,
    /// Shows "Loading ..." instead of "Load More" while a page is in flight.
    pub loading: bool,
}

impl LoadMoreControl {
    pub fn label(&self) -> &'static str {
        if self.loading { "Loading ..." } else { "Load More" }
    }
}

// ---------------------------------------------------------------------------
// Pager
// ---------------------------------------------------------------------------

/// The hashtag pager widget state.
#[derive(Debug, Clone)]
pub struct HashtagPager {
    cursor: PaginationCursor,
    entries: Vec<HashtagCount>,
    control: LoadMoreControl,
    in_flight: usize,
    guard_in_flight: bool,
}

impl HashtagPager {
    /// A fresh pager with the control hidden.
    pub fn new(page_size: u64, guard_in_flight: bool) -> Self {
        Self {
            cursor: PaginationCursor::new(page_size),
            entries: Vec::new(),
            control: LoadMoreControl::default(),
            in_flight: 0,
            guard_in_flight,
        }
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn entries(&self) -> &[HashtagCount] {
        &self.entries
    }

    pub fn control(&self) -> LoadMoreControl {
        self.control
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start loading the next page.
    ///
    /// Returns `None` when the in-flight guard is on and a page request is
    /// still outstanding.
    pub fn begin(&mut self, replace: bool) -> Option<PageRequest> {
        if self.guard_in_flight && self.in_flight > 0 {
            return None;
        }
        self.in_flight += 1;
        self.control.loading = true;
        Some(self.cursor.next_request(replace))
    }

    /// The "load more" click: continue from the cursor without clearing.
    ///
    /// Ignored while the control is hidden.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.control.visible {
            return None;
        }
        self.begin(false)
    }

    /// Apply a successfully fetched page.
    pub fn complete(&mut self, request: &PageRequest, page: HashtagPage) {
        self.settle();
        self.cursor.advance_past(request);

        if request.replace {
            self.entries.clear();
        }

        let returned = page.len() as u64;
        let mut incoming = page.entries;
        // Vec::sort_by is stable: equal counts keep backend order.
        incoming.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries.extend(incoming);

        let short = SHORT_PAGE_ENDS_PAGINATION && returned < self.cursor.page_size();
        self.control.visible = returned > 0 && !short;
    }

    /// Apply a failed page request: cursor, list and visibility are kept.
    pub fn fail(&mut self, _request: &PageRequest) {
        self.settle();
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.control.loading = self.in_flight > 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
