//! Remote list client abstraction.

use crate::error::{EngineError, EngineResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use stockview_protocol::{ListItem, ListQuery, Page};

/// Executes list requests against the remote API.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process loopback, mock for testing, etc.).
pub trait RemoteListClient: Send + Sync {
    /// Record type served by the endpoint.
    type Item: ListItem;

    /// Fetches one page for `query`.
    fn fetch_page(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = EngineResult<Page<Self::Item>>> + Send;

    /// Fetches a single record by key.
    fn fetch_item(&self, key: &str) -> impl Future<Output = EngineResult<Self::Item>> + Send;
}

/// A scripted client for testing.
///
/// Responses are returned in the order they were queued; every request is
/// recorded so tests can assert on what the engine asked for.
#[derive(Debug)]
pub struct MockClient<T> {
    connected: AtomicBool,
    pages: Mutex<VecDeque<EngineResult<Page<T>>>>,
    items: Mutex<VecDeque<EngineResult<T>>>,
    queries: Mutex<Vec<ListQuery>>,
}

impl<T: ListItem> MockClient<T> {
    /// Creates a new mock client.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            pages: Mutex::new(VecDeque::new()),
            items: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful page.
    pub fn push_page(&self, page: Page<T>) {
        self.pages.lock().push_back(Ok(page));
    }

    /// Queues a failed page request.
    pub fn push_error(&self, error: EngineError) {
        self.pages.lock().push_back(Err(error));
    }

    /// Queues a detail response.
    pub fn push_item(&self, item: EngineResult<T>) {
        self.items.lock().push_back(item);
    }

    /// Sets the connected state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Returns every query received so far.
    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().clone()
    }

    /// Returns the most recent query.
    pub fn last_query(&self) -> Option<ListQuery> {
        self.queries.lock().last().cloned()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl<T: ListItem> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ListItem> RemoteListClient for MockClient<T> {
    type Item = T;

    async fn fetch_page(&self, query: &ListQuery) -> EngineResult<Page<T>> {
        self.queries.lock().push(query.clone());
        if !self.is_connected() {
            return Err(EngineError::NotConnected);
        }
        self.pages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Decode("no mock page queued".into())))
    }

    async fn fetch_item(&self, _key: &str) -> EngineResult<T> {
        if !self.is_connected() {
            return Err(EngineError::NotConnected);
        }
        self.items
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Decode("no mock item queued".into())))
    }
}
