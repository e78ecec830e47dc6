//! Page sources
//!
//! A page source is the aggregator's only I/O dependency: given a
//! cancellation token and a [`Pagination`](crate::types::Pagination), it
//! returns exactly that window of records plus the source's own view of the
//! totals.
//!
//! # Implementations
//!
//! - [`FnSource`] - wraps an async closure (see [`source_fn`])
//! - [`HttpPageSource`] - `GET url?page=N&pagesize=M` against a JSON endpoint

mod http;
mod types;

pub use http::HttpPageSource;
pub use types::{source_fn, FnSource, PageSource};

#[cfg(test)]
mod tests;
