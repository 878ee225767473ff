//! Stock fixtures and engine helpers.
//!
//! Provides deterministic records and a ready-wired engine talking to
//! a [`FixtureServer`] over the loopback HTTP client.

use crate::server::FixtureServer;
use stockview_engine::{EngineConfig, HttpListClient, ListSyncEngine, LoopbackClient};
use stockview_protocol::StockRating;

/// Ratings cycled through by [`sample_stocks`].
pub const SAMPLE_RATINGS: &[&str] = &["Buy", "Hold", "Sell", "Neutral"];

/// Engine wired to a fixture server.
pub type FixtureEngine =
    ListSyncEngine<HttpListClient<LoopbackClient<FixtureServer>, StockRating>>;

/// Creates a record with a ticker and target rating.
pub fn stock(ticker: &str, rating_to: &str) -> StockRating {
    StockRating {
        ticker: ticker.to_string(),
        company: format!("{} Holdings", ticker),
        rating_from: rating_to.to_string(),
        rating_to: rating_to.to_string(),
        action: "target raised by".to_string(),
        brokerage: "Fixture Securities".to_string(),
        ..StockRating::default()
    }
}

/// Generates `count` deterministic records.
///
/// Tickers are `T0000`, `T0001`, ...; ratings cycle through
/// [`SAMPLE_RATINGS`]; `time` increases with the index, one minute apart.
pub fn sample_stocks(count: usize) -> Vec<StockRating> {
    (0..count)
        .map(|i| {
            let rating = SAMPLE_RATINGS[i % SAMPLE_RATINGS.len()];
            let mut record = stock(&format!("T{:04}", i), rating);
            record.time = format!(
                "2025-01-{:02}T{:02}:{:02}:00Z",
                1 + (i / 1440) % 28,
                (i / 60) % 24,
                i % 60
            );
            record.created_at = record.time.clone();
            record.updated_at = record.time.clone();
            let change = ((i * 37) % 200) as f64 / 10.0 - 10.0;
            record.change_percent = Some(format!("{:.2}", change));
            record
        })
        .collect()
}

/// Creates an engine backed by a fixture server holding `stocks`.
pub fn fixture_engine(stocks: Vec<StockRating>) -> FixtureEngine {
    fixture_engine_with_config(EngineConfig::default(), stocks)
}

/// Creates an engine with a custom configuration backed by a fixture server.
pub fn fixture_engine_with_config(
    config: EngineConfig,
    stocks: Vec<StockRating>,
) -> FixtureEngine {
    let client = HttpListClient::new(&config, LoopbackClient::new(FixtureServer::new(stocks)));
    ListSyncEngine::new(config, client)
}
