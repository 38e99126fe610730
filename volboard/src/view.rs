//! List view state.
//!
//! A list page keeps two copies of the search term: the text box contents
//! (pending) and the term the list is filtered by (committed). Typing arms a
//! debounce timer; the pending value is committed once the timer expires.
//! Responses to superseded fetches are dropped by sequence number so that an
//! out-of-order reply can never overwrite newer data.
//!
//! Time is passed in by the caller, which keeps the state deterministic.

use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;

use crate::filters::FilterCriteria;
use crate::normalize::{CategoryRules, normalize_payload};
use crate::pagination::Page;
use crate::query::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ListRequest, ListSort};
use crate::types::Record;

/// Delay applied to search input when none is configured.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// A value that becomes available only after `delay` has passed without a
/// newer value replacing it.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and restart the timer.
    pub fn set(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// Take the pending value regardless of the timer.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value without committing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.flush()
    }
}

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Hands out increasing tickets; only the newest one is current.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    issued: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }
}

/// What happened to a fetch response handed to [`ListView::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was started after this one; the response was dropped.
    Stale,
}

/// State behind one list page.
#[derive(Debug, Clone)]
pub struct ListView {
    records: Vec<Record>,
    criteria: FilterCriteria,
    search: Debounced<String>,
    sort: ListSort,
    page: u64,
    page_size: u64,
    requests: RequestTracker,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl ListView {
    pub fn new(page_size: u64, search_debounce: Duration) -> Self {
        Self {
            records: Vec::new(),
            criteria: FilterCriteria::default(),
            search: Debounced::new(search_debounce),
            sort: ListSort::default(),
            page: DEFAULT_PAGE,
            page_size: page_size.max(1),
            requests: RequestTracker::new(),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn sort(&self) -> ListSort {
        self.sort
    }

    /// Text box contents that have not been committed yet.
    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    // ========== Search input ==========

    /// Record a keystroke in the search box; the term is committed by a later
    /// [`poll`](Self::poll) once the debounce delay has passed.
    pub fn set_search_input(&mut self, term: impl Into<String>, now: Instant) {
        self.search.set(term.into(), now);
    }

    /// Commit the pending search term if it is due. Returns true when the
    /// committed criteria changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(term) => self.commit_search(term),
            None => false,
        }
    }

    /// Commit the pending search term immediately (e.g. on Enter).
    pub fn flush_search(&mut self) -> bool {
        match self.search.flush() {
            Some(term) => self.commit_search(term),
            None => false,
        }
    }

    /// Discard the pending search term.
    pub fn cancel_search(&mut self) {
        self.search.cancel();
    }

    fn commit_search(&mut self, term: String) -> bool {
        self.update_criteria(|criteria| criteria.search_term = term)
    }

    // ========== Committed criteria ==========

    /// Apply an edit to the committed criteria. The page resets to 1 when
    /// the edit changed anything. Returns whether it did.
    pub fn update_criteria<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut FilterCriteria),
    {
        let mut next = self.criteria.clone();
        edit(&mut next);
        if next == self.criteria {
            return false;
        }
        self.criteria = next;
        self.page = DEFAULT_PAGE;
        true
    }

    /// Replace the committed criteria wholesale.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> bool {
        self.update_criteria(|current| *current = criteria)
    }

    /// Back to the identity filter, dropping any pending search input.
    pub fn clear_filters(&mut self) -> bool {
        self.search.cancel();
        self.set_criteria(FilterCriteria::default())
    }

    pub fn set_sort(&mut self, sort: ListSort) {
        if sort != self.sort {
            self.sort = sort;
            self.page = DEFAULT_PAGE;
        }
    }

    // ========== Paging ==========

    fn total_pages(&self) -> u64 {
        self.current_page().total_pages
    }

    /// Move to `page`, clamped to the available pages.
    pub fn set_page(&mut self, page: u64) {
        self.page = page.clamp(DEFAULT_PAGE, self.total_pages().max(DEFAULT_PAGE));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    // ========== Fetching ==========

    /// Start a fetch. Any ticket handed out earlier becomes stale.
    pub fn begin_fetch(&mut self) -> Ticket {
        self.requests.begin()
    }

    /// Apply a fetch response if it belongs to the newest fetch. A failed
    /// fetch (`None`) empties the list.
    pub fn receive(&mut self, ticket: Ticket, records: Option<Vec<Record>>) -> FetchOutcome {
        if !self.requests.is_current(ticket) {
            debug!("discarding stale response for fetch #{}", ticket.sequence());
            return FetchOutcome::Stale;
        }
        self.records = records.unwrap_or_default();
        let last = self.total_pages().max(DEFAULT_PAGE);
        if self.page > last {
            self.page = last;
        }
        FetchOutcome::Applied
    }

    /// Normalize a raw list response and apply it.
    pub fn receive_payload(&mut self, ticket: Ticket, payload: Value, rules: &CategoryRules) -> FetchOutcome {
        if !self.requests.is_current(ticket) {
            debug!("discarding stale payload for fetch #{}", ticket.sequence());
            return FetchOutcome::Stale;
        }
        let records = normalize_payload(payload, rules);
        self.receive(ticket, Some(records))
    }

    // ========== Rendering ==========

    pub fn request(&self) -> ListRequest {
        ListRequest::default()
            .with_criteria(self.criteria.clone())
            .with_sort(self.sort)
            .with_page(self.page, self.page_size)
    }

    /// The page to render for the current state.
    pub fn current_page(&self) -> Page<&Record> {
        self.request().run(Some(self.records.as_slice()))
    }
}
