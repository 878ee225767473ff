//! # StockView Protocol
//!
//! List protocol types and the sort-token codec for StockView.
//!
//! This crate provides:
//! - `SortDescriptor` and the sort-token codec (`encode` / `decode`)
//! - `FilterState` for backend-delegated filtering
//! - `ListQuery`, the immutable request descriptor
//! - `Page` and `PaginationInfo` as decoded from the list API
//! - The `ListItem` trait and the `StockRating` record
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod filter;
mod item;
mod page;
mod query;
pub mod sort;

pub use error::{ProtocolError, ProtocolResult};
pub use filter::{FilterState, FILTER_RATING, FILTER_TICKET};
pub use item::{ListItem, StockRating};
pub use page::{ApiErrorBody, ItemEnvelope, Page, PaginationInfo, DEFAULT_PAGE_LIMIT};
pub use query::ListQuery;
pub use sort::{SortDescriptor, SortDirection, DEFAULT_SORT_FIELD, KNOWN_SORT_TOKENS};
