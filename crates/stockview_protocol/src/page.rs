//! Pages and pagination metadata returned by the list API.

use crate::error::ProtocolResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Pagination metadata reported by the server.
///
/// `has_next` is taken verbatim from the server and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Total number of matching records.
    pub total: u64,
    /// Page size used for this page.
    pub limit: u32,
    /// Offset of the first record of this page.
    pub offset: u64,
    /// Whether more records exist after this page.
    pub has_next: bool,
}

impl PaginationInfo {
    /// Pagination before anything has been loaded.
    pub const fn initial() -> Self {
        Self {
            total: 0,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            has_next: false,
        }
    }

    /// Offset of the page following this one.
    pub fn next_offset(&self) -> u64 {
        self.offset.saturating_add(u64::from(self.limit))
    }
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self::initial()
    }
}

/// One server response: a slice of items plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in server order. The stocks endpoint names this array `stocks`.
    #[serde(alias = "stocks")]
    pub items: Vec<T>,
    /// Pagination metadata.
    pub pagination: PaginationInfo,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, pagination: PaginationInfo) -> Self {
        Self { items, pagination }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Decodes a page from a JSON body.
    ///
    /// Fails if `items` or any of the four pagination fields is missing.
    pub fn from_json(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Single-record response (`{"stock": {...}}` on the stocks endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEnvelope<T> {
    /// The record.
    #[serde(alias = "stock")]
    pub item: T,
}

impl<T: DeserializeOwned> ItemEnvelope<T> {
    /// Decodes an envelope from a JSON body.
    pub fn from_json(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Error body returned by the API on non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Short error category.
    #[serde(default)]
    pub error: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    /// Best-effort decode; an unparseable body yields an empty error.
    pub fn from_json_lossy(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// Picks the most descriptive text available.
    pub fn describe(&self) -> &str {
        if !self.message.is_empty() {
            &self.message
        } else {
            &self.error
        }
    }
}
