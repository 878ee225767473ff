//! In-process fixture server for the stocks list API.
//!
//! Implements the list contract the engine relies on: backend-side filtering
//! on `ticket` (case-insensitive ticker substring) and `rating` (case-insensitive
//! match on `rating_to`), ordering on `sort_by`/`order` (or the `sort` token),
//! and `limit`/`offset` paging with `has_next = offset + limit < total`.

use parking_lot::Mutex;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::VecDeque;
use stockview_engine::{HttpResponse, LoopbackServer};
use stockview_protocol::{sort, SortDescriptor, SortDirection, StockRating, DEFAULT_PAGE_LIMIT};

/// A stocks API serving a fixed data set.
pub struct FixtureServer {
    stocks: Vec<StockRating>,
    requests: Mutex<Vec<RecordedRequest>>,
    injected: Mutex<VecDeque<HttpResponse>>,
}

/// A request seen by the fixture server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Returns the value of query parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl FixtureServer {
    /// Creates a server holding `stocks`.
    pub fn new(stocks: Vec<StockRating>) -> Self {
        Self {
            stocks,
            requests: Mutex::new(Vec::new()),
            injected: Mutex::new(VecDeque::new()),
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    /// Returns true if no records are held.
    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Makes the next request answer with `response` instead of real data.
    pub fn inject_response(&self, response: HttpResponse) {
        self.injected.lock().push_back(response);
    }

    /// Makes the next request fail with an API error body.
    pub fn fail_next(&self, status: u16, message: &str) {
        let body = json!({ "error": "Internal server error", "message": message });
        self.inject_response(HttpResponse::with_status(status, body.to_string()));
    }

    /// Returns every request handled so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn list(&self, query: &[(String, String)]) -> HttpResponse {
        let param = |name: &str| {
            query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .filter(|value| !value.is_empty())
        };

        let limit = param("limit")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(u64::from(DEFAULT_PAGE_LIMIT));
        let offset = param("offset")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let sort = match (param("sort_by"), param("order")) {
            (Some(field), order) => SortDescriptor::new(
                field,
                order
                    .and_then(SortDirection::from_suffix)
                    .unwrap_or_default(),
            ),
            (None, _) => param("sort").map(sort::decode_or_default).unwrap_or_default(),
        };

        let ticket = param("ticket").map(str::to_lowercase);
        let rating = param("rating").map(str::to_lowercase);

        let mut matching: Vec<&StockRating> = self
            .stocks
            .iter()
            .filter(|s| {
                ticket
                    .as_deref()
                    .is_none_or(|t| s.ticker.to_lowercase().contains(t))
            })
            .filter(|s| {
                rating
                    .as_deref()
                    .is_none_or(|r| s.rating_to.to_lowercase() == r)
            })
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare_on(sort.field(), a, b);
            match sort.direction() {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let page: Vec<&StockRating> = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        let body = json!({
            "stocks": page,
            "pagination": {
                "total": total,
                "limit": limit,
                "offset": offset,
                "has_next": offset + limit < total,
            },
        });
        HttpResponse::ok(body.to_string())
    }

    fn detail(&self, ticker: &str) -> HttpResponse {
        match self.stocks.iter().find(|s| s.ticker == ticker) {
            Some(stock) => HttpResponse::ok(json!({ "stock": stock }).to_string()),
            None => HttpResponse::with_status(
                404,
                json!({ "error": "Not found", "message": "Stock not found" }).to_string(),
            ),
        }
    }
}

impl LoopbackServer for FixtureServer {
    fn handle_get(&self, path: &str, query: &[(String, String)]) -> HttpResponse {
        self.requests.lock().push(RecordedRequest {
            path: path.to_string(),
            query: query.to_vec(),
        });

        if let Some(response) = self.injected.lock().pop_front() {
            return response;
        }

        let path = path.trim_end_matches('/');
        if path.ends_with("/stocks") {
            return self.list(query);
        }
        match path.rsplit_once("/stocks/") {
            Some((_, ticker)) if !ticker.is_empty() => self.detail(&decode_path_segment(ticker)),
            _ => HttpResponse::with_status(
                404,
                json!({ "error": "Not found", "message": "Unknown endpoint" }).to_string(),
            ),
        }
    }
}

/// Reverses percent-encoding; malformed escapes are kept as-is.
fn decode_path_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| segment.get(i + 1..i + 3))
            .flatten()
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                decoded.push(byte);
                i += 3;
            }
            None => {
                decoded.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Orders two records on a sortable field; unknown fields order by time.
fn compare_on(field: &str, a: &StockRating, b: &StockRating) -> Ordering {
    match field {
        "ticker" => a.ticker.cmp(&b.ticker),
        "rating_to" => a.rating_to.cmp(&b.rating_to),
        "change_percent" => {
            let value = |s: &StockRating| {
                s.change_percent
                    .as_deref()
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };
            value(a).total_cmp(&value(b))
        }
        _ => a.time.cmp(&b.time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_stocks, stock};
    use stockview_protocol::Page;

    fn get(server: &FixtureServer, pairs: &[(&str, &str)]) -> Page<StockRating> {
        let query: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let response = server.handle_get("/api/v1/public/stocks", &query);
        assert!(response.is_success());
        Page::from_json(&response.body).unwrap()
    }

    #[test]
    fn pages_with_has_next() {
        let server = FixtureServer::new(sample_stocks(120));

        let page = get(&server, &[("limit", "50"), ("offset", "100")]);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.pagination.total, 120);
        assert!(!page.pagination.has_next);

        let page = get(&server, &[("limit", "50"), ("offset", "50")]);
        assert!(page.pagination.has_next);
    }

    #[test]
    fn default_order_is_newest_first() {
        let server = FixtureServer::new(sample_stocks(5));
        let page = get(&server, &[]);
        assert_eq!(page.items[0].ticker, "T0004");
        assert_eq!(page.pagination.limit, 50);
    }

    #[test]
    fn filters_by_ticket_and_rating() {
        let server = FixtureServer::new(vec![
            stock("AAPL", "Buy"),
            stock("AAL", "Sell"),
            stock("MSFT", "Buy"),
        ]);

        let page = get(&server, &[("ticket", "aa"), ("sort_by", "ticker"), ("order", "asc")]);
        let tickers: Vec<&str> = page.items.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAL", "AAPL"]);

        let page = get(&server, &[("rating", "buy")]);
        assert_eq!(page.pagination.total, 2);

        let page = get(&server, &[("rating", "")]);
        assert_eq!(page.pagination.total, 3);
    }

    #[test]
    fn sort_token_fallback() {
        let server = FixtureServer::new(vec![stock("B", "Buy"), stock("A", "Buy")]);
        let page = get(&server, &[("sort", "ticker_asc")]);
        assert_eq!(page.items[0].ticker, "A");
    }

    #[test]
    fn detail_and_not_found() {
        let server = FixtureServer::new(vec![stock("AAPL", "Buy")]);
        let response = server.handle_get("/api/v1/public/stocks/AAPL", &[]);
        assert!(response.is_success());

        let response = server.handle_get("/api/v1/public/stocks/NOPE", &[]);
        assert_eq!(response.status, 404);
    }

    #[test]
    fn detail_key_is_percent_decoded() {
        let server = FixtureServer::new(vec![stock("BRK/B", "Buy")]);
        let response = server.handle_get("/api/v1/public/stocks/BRK%2FB", &[]);
        assert!(response.is_success());

        assert_eq!(decode_path_segment("a%20b%zz%4"), "a b%zz%4");
    }

    #[test]
    fn injected_failure_is_consumed() {
        let server = FixtureServer::new(sample_stocks(1));
        server.fail_next(500, "Failed to retrieve stocks");

        let response = server.handle_get("/api/v1/public/stocks", &[]);
        assert_eq!(response.status, 500);
        let response = server.handle_get("/api/v1/public/stocks", &[]);
        assert!(response.is_success());
        assert_eq!(server.requests().len(), 2);
    }
}
