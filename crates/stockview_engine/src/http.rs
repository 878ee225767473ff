//! HTTP list client.
//!
//! This module provides an HTTP-based [`RemoteListClient`]. The actual HTTP
//! library is abstracted via [`HttpClient`] so that any implementation
//! (reqwest, hyper, a browser fetch bridge, ...) can be plugged in.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::transport::RemoteListClient;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use stockview_protocol::{ApiErrorBody, ItemEnvelope, ListItem, ListQuery, Page};
use tracing::warn;

/// A GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Request timeout.
    pub timeout: Duration,
}

/// A response with its raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a 200 response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Creates a response with the given status.
    pub fn with_status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual transport. An `Err` means the
/// request never produced a response (connection refused, timeout, ...).
pub trait HttpClient: Send + Sync {
    /// Sends a GET request.
    fn get(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, String>> + Send;

    /// Checks if the client is connected/healthy.
    fn is_healthy(&self) -> bool;
}

/// HTTP-based list client decoding JSON pages into `T`.
pub struct HttpListClient<C: HttpClient, T> {
    /// Full URL of the list endpoint.
    list_url: String,
    /// Request timeout.
    timeout: Duration,
    /// HTTP client implementation.
    client: C,
    /// Connection state.
    connected: AtomicBool,
    /// Last transport error message.
    last_error: RwLock<Option<String>>,
    _item: PhantomData<fn() -> T>,
}

impl<C: HttpClient, T> HttpListClient<C, T> {
    /// Creates a client for the list endpoint described by `config`.
    pub fn new(config: &EngineConfig, client: C) -> Self {
        Self {
            list_url: config.list_url(),
            timeout: config.timeout,
            client,
            connected: AtomicBool::new(true),
            last_error: RwLock::new(None),
            _item: PhantomData,
        }
    }

    /// Returns the list endpoint URL.
    pub fn list_url(&self) -> &str {
        &self.list_url
    }

    /// Returns the underlying HTTP client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Returns true if the last request reached the server and the client
    /// reports itself healthy.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.client.is_healthy()
    }

    /// Returns the last transport error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    async fn send(&self, url: String, query: Vec<(String, String)>) -> EngineResult<Vec<u8>> {
        if !self.client.is_healthy() {
            return Err(EngineError::NotConnected);
        }

        let request_url = url.clone();
        let request = HttpRequest {
            url,
            query,
            timeout: self.timeout,
        };

        let response = match self.client.get(request).await {
            Ok(response) => response,
            Err(message) => {
                warn!(url = %request_url, error = %message, "request did not reach server");
                *self.last_error.write() = Some(message.clone());
                self.connected.store(false, Ordering::SeqCst);
                return Err(EngineError::transport_retryable(message));
            }
        };

        *self.last_error.write() = None;
        self.connected.store(true, Ordering::SeqCst);

        if !response.is_success() {
            let body = ApiErrorBody::from_json_lossy(&response.body);
            let message = match body.describe() {
                "" => format!("request failed with status {}", response.status),
                text => text.to_string(),
            };
            return Err(EngineError::Server {
                status: response.status,
                message,
            });
        }

        Ok(response.body)
    }
}

impl<C, T> RemoteListClient for HttpListClient<C, T>
where
    C: HttpClient,
    T: ListItem + DeserializeOwned,
{
    type Item = T;

    async fn fetch_page(&self, query: &ListQuery) -> EngineResult<Page<T>> {
        let body = self
            .send(self.list_url.clone(), query.to_query_pairs())
            .await?;
        Ok(Page::from_json(&body)?)
    }

    async fn fetch_item(&self, key: &str) -> EngineResult<T> {
        if key.is_empty() {
            return Err(EngineError::Validation("item key is empty".into()));
        }
        let url = format!("{}/{}", self.list_url, encode_path_segment(key));
        let body = self.send(url, Vec::new()).await?;
        Ok(ItemEnvelope::from_json(&body)?.item)
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a GET request for `path` and returns the response.
    fn handle_get(&self, path: &str, query: &[(String, String)]) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to an in-process server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
    healthy: AtomicBool,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self {
            server,
            healthy: AtomicBool::new(true),
        }
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }

    /// Simulates the network going down or coming back.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        // Strip scheme and authority, keep the path.
        let path = match request.url.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
            None => request.url.as_str(),
        };
        Ok(self.server.handle_get(path, &request.query))
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockview_protocol::{SortDescriptor, StockRating};

    struct TestClient {
        response: RwLock<Result<HttpResponse, String>>,
        requests: RwLock<Vec<HttpRequest>>,
        healthy: AtomicBool,
    }

    impl TestClient {
        fn new() -> Self {
            Self {
                response: RwLock::new(Err("No response set".into())),
                requests: RwLock::new(Vec::new()),
                healthy: AtomicBool::new(true),
            }
        }

        fn set_response(&self, resp: Result<HttpResponse, String>) {
            *self.response.write() = resp;
        }

        fn set_healthy(&self, healthy: bool) {
            self.healthy.store(healthy, Ordering::SeqCst);
        }
    }

    impl HttpClient for TestClient {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse, String> {
            self.requests.write().push(request);
            self.response.read().clone()
        }

        fn is_healthy(&self) -> bool {
            self.healthy.load(Ordering::SeqCst)
        }
    }

    fn client() -> HttpListClient<TestClient, StockRating> {
        HttpListClient::new(
            &EngineConfig::new("https://api.example.com/api/v1/public"),
            TestClient::new(),
        )
    }

    fn query() -> ListQuery {
        ListQuery::new(50, 0, &SortDescriptor::default(), Default::default())
    }

    const PAGE_BODY: &str = r#"{
        "stocks": [{"ticker": "AAPL"}],
        "pagination": {"total": 1, "limit": 50, "offset": 0, "has_next": false}
    }"#;

    #[test]
    fn client_creation() {
        let client = client();
        assert_eq!(
            client.list_url(),
            "https://api.example.com/api/v1/public/stocks"
        );
        assert!(client.is_connected());
    }

    #[test]
    fn unhealthy_client() {
        let client = client();
        client.inner().set_healthy(false);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn fetch_page_decodes_body() {
        let client = client();
        client.inner().set_response(Ok(HttpResponse::ok(PAGE_BODY)));

        let page = client.fetch_page(&query()).await.unwrap();
        assert_eq!(page.items[0].ticker, "AAPL");

        let requests = client.inner().requests.read().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.example.com/api/v1/public/stocks");
        assert!(requests[0]
            .query
            .contains(&("sort".to_string(), "time_desc".to_string())));
        assert_eq!(requests[0].timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn transport_failure_disconnects() {
        let client = client();
        client.inner().set_response(Err("connection refused".into()));

        let err = client.fetch_page(&query()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!client.is_connected());
        assert_eq!(client.last_error().as_deref(), Some("connection refused"));

        client.inner().set_response(Ok(HttpResponse::ok(PAGE_BODY)));
        client.fetch_page(&query()).await.unwrap();
        assert!(client.is_connected());
        assert!(client.last_error().is_none());
    }

    #[tokio::test]
    async fn unhealthy_client_not_connected_error() {
        let client = client();
        client.inner().set_healthy(false);
        let result = client.fetch_page(&query()).await;
        assert!(matches!(result, Err(EngineError::NotConnected)));
    }

    #[tokio::test]
    async fn server_error_body() {
        let client = client();
        client.inner().set_response(Ok(HttpResponse::with_status(
            500,
            r#"{"error": "Internal server error", "message": "Failed to retrieve stocks"}"#,
        )));

        let err = client.fetch_page(&query()).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::Server {
                status: 500,
                message: "Failed to retrieve stocks".into()
            }
        );

        client
            .inner()
            .set_response(Ok(HttpResponse::with_status(502, "bad gateway")));
        let err = client.fetch_page(&query()).await.unwrap_err();
        assert!(err.to_string().contains("status 502"));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let client = client();
        client
            .inner()
            .set_response(Ok(HttpResponse::ok(r#"{"stocks": []}"#)));

        let err = client.fetch_page(&query()).await.unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[tokio::test]
    async fn fetch_item_uses_detail_path() {
        let client = client();
        client
            .inner()
            .set_response(Ok(HttpResponse::ok(r#"{"stock": {"ticker": "MSFT"}}"#)));

        let item = client.fetch_item("MSFT").await.unwrap();
        assert_eq!(item.ticker, "MSFT");

        let requests = client.inner().requests.read().clone();
        assert_eq!(
            requests[0].url,
            "https://api.example.com/api/v1/public/stocks/MSFT"
        );
        assert!(requests[0].query.is_empty());
    }

    #[tokio::test]
    async fn fetch_item_escapes_key() {
        let client = client();
        client
            .inner()
            .set_response(Ok(HttpResponse::ok(r#"{"stock": {"ticker": "BRK/B"}}"#)));

        client.fetch_item("BRK/B?x#1 %").await.unwrap();

        let requests = client.inner().requests.read().clone();
        assert_eq!(
            requests[0].url,
            "https://api.example.com/api/v1/public/stocks/BRK%2FB%3Fx%231%20%25"
        );
    }

    #[tokio::test]
    async fn fetch_item_rejects_empty_key() {
        let client = client();
        client.inner().set_response(Ok(HttpResponse::ok(PAGE_BODY)));

        let err = client.fetch_item("").await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(client.inner().requests.read().is_empty());
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_path_segment("AAPL"), "AAPL");
        assert_eq!(encode_path_segment("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode_path_segment("é"), "%C3%A9");
    }

    struct EchoServer;

    impl LoopbackServer for EchoServer {
        fn handle_get(&self, path: &str, query: &[(String, String)]) -> HttpResponse {
            HttpResponse::ok(format!("{}?{}", path, query.len()))
        }
    }

    #[tokio::test]
    async fn loopback_strips_authority() {
        let client = LoopbackClient::new(EchoServer);
        let response = client
            .get(HttpRequest {
                url: "http://localhost:8080/api/v1/public/stocks".into(),
                query: vec![("limit".into(), "1".into())],
                timeout: Duration::from_secs(1),
            })
            .await
            .unwrap();
        assert_eq!(response.body, b"/api/v1/public/stocks?1".to_vec());

        client.set_healthy(false);
        assert!(!client.is_healthy());
    }
}
