//! # Page Aggregator
//!
//! Serve arbitrarily large pages from data sources whose API caps the page
//! size.
//!
//! A caller asks for page `N` of size `M`. The source serves at most `E`
//! records per call. The aggregator fetches the first window itself to learn
//! the source's total, fans the remaining windows out concurrently, puts the
//! results back in page order and reports pagination in the caller's page
//! size.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use page_aggregator::{fetch_paginated_external, source_fn, FetchedPage, Pagination, PaginationResult};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> page_aggregator::Result<()> {
//!     let source = source_fn(|_cancel, pagination: Pagination| async move {
//!         // ask the upstream service for at most 50 records
//!         let (items, total) = songs_client.list(pagination).await?;
//!         Ok(FetchedPage::new(items, PaginationResult::new(pagination.page, pagination.page_size, total)))
//!     });
//!
//!     let cancel = CancellationToken::new();
//!     let page = fetch_paginated_external(&cancel, Arc::new(source), Pagination::new(1, 200), 50).await?;
//!     println!("{} of {} records", page.len(), page.pagination.total_records);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   fetch_paginated_external(cancel, source, page, ceiling)    │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴──┬────────────────┬───────────┐
//! │   Planner    │    Executor      │  Resequencer   │  Sources  │
//! ├──────────────┼──────────────────┼────────────────┼───────────┤
//! │ first window │ first: inline    │ ordinal sort   │ closure   │
//! │ follow-ups   │ rest: fan-out    │ concatenate    │ HTTP JSON │
//! │ sizing       │ join + channel   │ trim, totals   │           │
//! └──────────────┴──────────────────┴────────────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Pagination value types
pub mod types;

/// Request planning, fan-out and merging
pub mod aggregate;

/// Page sources (closures, HTTP)
pub mod source;

/// HTTP client with retry and backoff
pub mod http;

/// Aggregator and source configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use aggregate::{fetch_paginated_external, Aggregator};
pub use config::{load_config, load_config_from_str, AggregatorConfig, SourceConfig};
pub use error::{Error, Result};
pub use source::{source_fn, HttpPageSource, PageSource};
pub use types::{FetchedPage, PageEnvelope, Pagination, PaginationResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
