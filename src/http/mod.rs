//! HTTP client module
//!
//! Provides the retrying HTTP client the HTTP page source is built on.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx, timeouts and connection failures
//! - **Exponential Backoff**: Capped delay doubling between attempts
//! - **JSON Responses**: Typed decoding with `serde`

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
