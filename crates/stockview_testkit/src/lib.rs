//! # StockView Testkit
//!
//! Test utilities for StockView.
//!
//! This crate provides:
//! - An in-process fixture server honouring the stocks list contract
//! - Stock fixtures
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockview_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_fixture_server() {
//!     let engine = fixture_engine(sample_stocks(120));
//!     engine.load(Default::default()).await;
//!     assert_eq!(engine.items().len(), 50);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::server::*;
}

pub use fixtures::*;
pub use generators::*;
pub use server::*;
