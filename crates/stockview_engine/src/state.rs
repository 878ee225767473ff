//! List engine state machine.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::query::{QueryBuilder, QueryOverrides};
use crate::transport::RemoteListClient;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use stockview_protocol::{FilterState, ListQuery, Page, PaginationInfo, SortDescriptor};
use tracing::{debug, warn};

/// Phase of the most recent load-family operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing has been requested since construction or reset.
    Idle,
    /// At least one request is in flight.
    Loading,
    /// The last request to complete succeeded.
    Settled,
    /// The last request to complete failed.
    Failed,
}

/// How a fetched page is merged into held items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Held items are discarded in favour of the page.
    Replace,
    /// Page items are added after the held items.
    Append,
}

impl MergeStrategy {
    /// Offset-zero rule: a request at offset 0 replaces, anything later appends.
    pub fn for_offset(offset: u64) -> Self {
        if offset == 0 {
            MergeStrategy::Replace
        } else {
            MergeStrategy::Append
        }
    }

    /// Merges `incoming` into `held`.
    pub fn apply<T>(self, held: &mut Vec<T>, incoming: Vec<T>) {
        match self {
            MergeStrategy::Replace => *held = incoming,
            MergeStrategy::Append => held.extend(incoming),
        }
    }
}

/// The client-held representation of the list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    /// Items in server order, across every page loaded so far.
    pub items: Vec<T>,
    /// Pagination as last reported by the server.
    pub pagination: PaginationInfo,
    /// Active filter.
    pub filter: FilterState,
    /// Active sort.
    pub sort: SortDescriptor,
    /// Whether a request is in flight.
    pub loading: bool,
    /// Message of the last failure, cleared when a new request starts.
    pub error: Option<String>,
    /// Record fetched by the last detail load.
    pub current: Option<T>,
}

impl<T> ViewState<T> {
    /// Initial state: no items, initial pagination, empty filter.
    pub fn new(sort: SortDescriptor) -> Self {
        Self {
            items: Vec::new(),
            pagination: PaginationInfo::initial(),
            filter: FilterState::new(),
            sort,
            loading: false,
            error: None,
            current: None,
        }
    }

    /// Returns true if the server reported more items.
    pub fn has_more_pages(&self) -> bool {
        self.pagination.has_next
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::new(SortDescriptor::default())
    }
}

/// Counters about engine activity.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Requests sent to the server (pages and details).
    pub loads_started: u64,
    /// Requests that completed successfully.
    pub loads_succeeded: u64,
    /// Sent requests that failed.
    pub loads_failed: u64,
    /// Operations rejected before anything was sent.
    pub queries_rejected: u64,
    /// Items received across all pages.
    pub items_received: u64,
    /// Id of the most recently issued request.
    pub last_request_id: u64,
    /// Completion time of the last successful request.
    pub last_load_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

struct Inner<T> {
    view: ViewState<T>,
    in_flight: usize,
    last_outcome: LoadPhase,
    /// Bumped by `reset`; guards from an older epoch no longer count.
    epoch: u64,
}

/// Marks a request in flight; clears `loading` on every exit path,
/// including the request future being dropped.
struct LoadingGuard<'a, T> {
    inner: &'a RwLock<Inner<T>>,
    epoch: u64,
}

impl<'a, T> LoadingGuard<'a, T> {
    fn begin(inner: &'a RwLock<Inner<T>>) -> Self {
        let epoch = {
            let mut inner = inner.write();
            inner.in_flight += 1;
            inner.view.loading = true;
            inner.view.error = None;
            inner.epoch
        };
        Self { inner, epoch }
    }
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.inner.write();
        if inner.epoch != self.epoch {
            return;
        }
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.view.loading = inner.in_flight > 0;
    }
}

/// Construction-time view: configured sort and page size, nothing loaded.
fn initial_view<T>(config: &EngineConfig) -> ViewState<T> {
    let mut view = ViewState::new(config.default_sort.clone());
    view.pagination.limit = config.default_limit;
    view
}

/// Owns a paginated list view and keeps it in sync with the remote API.
///
/// Operations take `&self` and may overlap. There is no cancellation and no
/// internal ordering: whichever response completes last is applied last.
/// Callers that need strict ordering must serialize calls themselves.
pub struct ListSyncEngine<C: RemoteListClient> {
    config: EngineConfig,
    client: Arc<C>,
    builder: QueryBuilder,
    inner: RwLock<Inner<C::Item>>,
    stats: RwLock<EngineStats>,
    next_request_id: AtomicU64,
}

impl<C: RemoteListClient> ListSyncEngine<C> {
    /// Creates a new engine.
    pub fn new(config: EngineConfig, client: C) -> Self {
        Self::with_shared_client(config, Arc::new(client))
    }

    /// Creates a new engine over a client shared with other engines.
    pub fn with_shared_client(config: EngineConfig, client: Arc<C>) -> Self {
        let builder = QueryBuilder::new(&config);
        let view = initial_view(&config);
        Self {
            config,
            client,
            builder,
            inner: RwLock::new(Inner {
                view,
                in_flight: 0,
                last_outcome: LoadPhase::Idle,
                epoch: 0,
            }),
            stats: RwLock::new(EngineStats::default()),
            next_request_id: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Loads the first page (or the page at `overrides.offset`).
    pub async fn load(&self, overrides: QueryOverrides) {
        let overrides = QueryOverrides {
            offset: Some(overrides.offset.unwrap_or(0)),
            ..overrides
        };
        self.execute(overrides).await;
    }

    /// Loads the page after the last one reported by the server and appends it.
    ///
    /// Not short-circuited when `has_next` is false; callers should check
    /// [`has_more_pages`](Self::has_more_pages) first.
    pub async fn load_more(&self) {
        let offset = self.inner.read().view.pagination.next_offset();
        self.execute(QueryOverrides::none().with_offset(offset))
            .await;
    }

    /// Merges `fields` into the filter and reloads from the first page.
    pub async fn apply_filter(&self, fields: FilterState) {
        self.inner.write().view.filter.merge(&fields);
        self.load(QueryOverrides::none()).await;
    }

    /// Stores `sort` and reloads from the first page.
    pub async fn apply_sort(&self, sort: SortDescriptor) {
        self.inner.write().view.sort = sort;
        self.load(QueryOverrides::none()).await;
    }

    /// Merges `fields` into the filter without fetching.
    pub fn update_filters(&self, fields: FilterState) {
        self.inner.write().view.filter.merge(&fields);
    }

    /// Fetches a single record into [`current`](Self::current).
    ///
    /// Held items and pagination are not touched. An empty key is rejected
    /// without a request.
    pub async fn load_detail(&self, key: &str) {
        let request_id = self.next_request_id();
        let _guard = LoadingGuard::begin(&self.inner);

        if key.is_empty() {
            let err = EngineError::Validation("item key is empty".into());
            self.record_failure(request_id, &err);
            return;
        }

        debug!(request_id, key, "requesting item");
        self.record_started();

        match self.client.fetch_item(key).await {
            Ok(item) => {
                let mut inner = self.inner.write();
                inner.view.current = Some(item);
                inner.view.error = None;
                inner.last_outcome = LoadPhase::Settled;
                drop(inner);
                self.record_success(0);
            }
            Err(err) => self.record_failure(request_id, &err),
        }
    }

    /// Asks the server how many records match `filter`.
    ///
    /// Sends a one-record request from offset 0 and returns the reported
    /// total. The held filter and the view are not read or touched.
    pub async fn fetch_total(&self, filter: &FilterState) -> EngineResult<u64> {
        let query = ListQuery::new(1, 0, &self.config.default_sort, filter.active_params());
        debug!(filters = query.filter_params().len(), "requesting total");
        let page = self.client.fetch_page(&query).await?;
        Ok(page.pagination.total)
    }

    /// Restores the construction-time state. No request is made.
    ///
    /// Requests already in flight are detached: they no longer hold
    /// `loading` (so `loading` is false and the phase is `Idle`), but each
    /// still applies its result when it completes.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.view = initial_view(&self.config);
        inner.last_outcome = LoadPhase::Idle;
        inner.in_flight = 0;
        inner.epoch += 1;
    }

    /// Clears the error message.
    pub fn clear_error(&self) {
        self.inner.write().view.error = None;
    }

    /// Returns a snapshot of the whole view.
    pub fn state(&self) -> ViewState<C::Item> {
        self.inner.read().view.clone()
    }

    /// Returns the held items.
    pub fn items(&self) -> Vec<C::Item> {
        self.inner.read().view.items.clone()
    }

    /// Returns the held pagination.
    pub fn pagination(&self) -> PaginationInfo {
        self.inner.read().view.pagination
    }

    /// Returns the active filter.
    pub fn filter(&self) -> FilterState {
        self.inner.read().view.filter.clone()
    }

    /// Returns the active sort.
    pub fn sort(&self) -> SortDescriptor {
        self.inner.read().view.sort.clone()
    }

    /// Returns true while any request is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().view.loading
    }

    /// Returns the current error message.
    pub fn error(&self) -> Option<String> {
        self.inner.read().view.error.clone()
    }

    /// Returns the record loaded by the last detail load.
    pub fn current(&self) -> Option<C::Item> {
        self.inner.read().view.current.clone()
    }

    /// Returns true if the server reported more items.
    pub fn has_more_pages(&self) -> bool {
        self.inner.read().view.has_more_pages()
    }

    /// Total number of matching records reported by the server.
    pub fn total(&self) -> u64 {
        self.inner.read().view.pagination.total
    }

    /// Returns the current phase.
    pub fn phase(&self) -> LoadPhase {
        let inner = self.inner.read();
        if inner.in_flight > 0 {
            LoadPhase::Loading
        } else {
            inner.last_outcome
        }
    }

    /// Returns the current stats.
    pub fn stats(&self) -> EngineStats {
        self.stats.read().clone()
    }

    /// Single path shared by every list load.
    async fn execute(&self, overrides: QueryOverrides) {
        let request_id = self.next_request_id();
        let _guard = LoadingGuard::begin(&self.inner);

        let query = {
            let inner = self.inner.read();
            self.builder.build(&inner.view, &overrides)
        };
        let query = match query {
            Ok(query) => query,
            Err(err) => {
                self.record_failure(request_id, &err);
                return;
            }
        };

        debug!(
            request_id,
            offset = query.offset(),
            limit = query.limit(),
            sort = query.sort_token(),
            "requesting page"
        );
        self.record_started();

        match self.client.fetch_page(&query).await {
            Ok(page) => self.apply_page(request_id, &query, page),
            Err(err) => self.record_failure(request_id, &err),
        }
    }

    fn apply_page(&self, request_id: u64, query: &ListQuery, page: Page<C::Item>) {
        let strategy = MergeStrategy::for_offset(query.offset());
        let received = page.items.len() as u64;

        {
            let mut inner = self.inner.write();
            strategy.apply(&mut inner.view.items, page.items);
            inner.view.pagination = page.pagination;
            inner.view.error = None;
            inner.last_outcome = LoadPhase::Settled;

            debug!(
                request_id,
                ?strategy,
                received,
                held = inner.view.items.len(),
                total = page.pagination.total,
                has_next = page.pagination.has_next,
                "page merged"
            );
        }

        self.record_success(received);
    }

    fn next_request_id(&self) -> u64 {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.write().last_request_id = request_id;
        request_id
    }

    fn record_started(&self) {
        self.stats.write().loads_started += 1;
    }

    fn record_success(&self, received: u64) {
        let mut stats = self.stats.write();
        stats.loads_succeeded += 1;
        stats.items_received += received;
        stats.last_load_time = Some(Instant::now());
    }

    /// Leaves items and pagination untouched.
    fn record_failure(&self, request_id: u64, error: &EngineError) {
        let message = error.to_string();
        warn!(request_id, error = %message, "load failed");

        {
            let mut inner = self.inner.write();
            inner.view.error = Some(message.clone());
            inner.last_outcome = LoadPhase::Failed;
        }

        let mut stats = self.stats.write();
        if matches!(error, EngineError::Validation(_)) {
            stats.queries_rejected += 1;
        } else {
            stats.loads_failed += 1;
        }
        stats.last_error = Some(message);
    }
}
