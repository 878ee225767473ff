//! List items.

use serde::{Deserialize, Serialize};

/// A record held in a paginated list.
///
/// The engine only relies on a stable identity; everything else is opaque.
pub trait ListItem: Clone + Send + Sync + 'static {
    /// Returns the stable identity of the record.
    fn key(&self) -> &str;
}

/// An analyst rating change for a ticker, as served by the stocks API.
///
/// Timestamps are kept as the RFC 3339 strings the API emits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockRating {
    /// Ticker symbol (identity).
    pub ticker: String,
    /// Company name.
    #[serde(default)]
    pub company: String,
    /// Previous price target.
    #[serde(default)]
    pub target_from: String,
    /// New price target.
    #[serde(default)]
    pub target_to: String,
    /// Previous rating.
    #[serde(default)]
    pub rating_from: String,
    /// New rating.
    #[serde(default)]
    pub rating_to: String,
    /// Action taken by the brokerage (e.g. "upgraded by").
    #[serde(default)]
    pub action: String,
    /// Brokerage issuing the rating.
    #[serde(default)]
    pub brokerage: String,
    /// Time of the rating change.
    #[serde(default)]
    pub time: String,
    /// Record creation time.
    #[serde(default)]
    pub created_at: String,
    /// Record update time.
    #[serde(default)]
    pub updated_at: String,
    /// Target change percentage, when the backend computes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<String>,
}

impl StockRating {
    /// Creates a record with only the identity set.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }
}

impl ListItem for StockRating {
    fn key(&self) -> &str {
        &self.ticker
    }
}
