//! # StockView Engine
//!
//! Paginated list synchronization engine for StockView.
//!
//! This crate provides:
//! - List state machine (idle → loading → settled / failed)
//! - Query building from held view state
//! - The offset-zero merge rule (replace vs. append)
//! - Remote list client abstraction
//! - HTTP client over a pluggable GET transport
//!
//! ## Architecture
//!
//! A caller intent (`load`, `load_more`, `apply_filter`, ...) is turned into a
//! [`ListQuery`](stockview_protocol::ListQuery) by the [`QueryBuilder`], sent
//! through a [`RemoteListClient`], and the returned page is merged into the
//! engine's [`ViewState`].
//!
//! ## Key Invariants
//!
//! - A request at offset 0 replaces held items; any later offset appends
//! - Pagination is always replaced wholesale with the server's latest values
//! - Failures never escape the engine; they land in `ViewState::error`
//! - `loading` is cleared on every exit path
//! - Filtering and sorting are delegated to the server

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod query;
mod state;
mod transport;

pub use config::{EngineConfig, DEFAULT_BASE_URL, ENV_API_URL, ENV_PAGE_SIZE, ENV_TIMEOUT_SECS};
pub use error::{EngineError, EngineResult};
pub use http::{HttpClient, HttpListClient, HttpRequest, HttpResponse, LoopbackClient, LoopbackServer};
pub use query::{QueryBuilder, QueryOverrides};
pub use state::{EngineStats, ListSyncEngine, LoadPhase, MergeStrategy, ViewState};
pub use transport::{MockClient, RemoteListClient};
