//! Configuration types for the aggregator and the HTTP page source
//!
//! A source file describes one upstream collection endpoint and how far the
//! aggregator may fan out against it:
//!
//! ```yaml
//! url: https://songs.internal/api/songs
//! external_page_size: 50
//! max_concurrency: 8
//! page_param: page
//! page_size_param: pagesize
//! items_field: data
//! pagination_field: pagination
//! headers:
//!   X-API-Key: secret
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Aggregator Config
// ============================================================================

/// Settings for one aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Largest page the source will serve in one call
    pub external_page_size: u32,

    /// Cap on concurrently running follow-up fetches (`None` = unbounded)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl AggregatorConfig {
    /// Create an unbounded aggregator config
    pub fn new(external_page_size: u32) -> Self {
        Self {
            external_page_size,
            max_concurrency: None,
        }
    }

    /// Bound the number of concurrent follow-up fetches
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if self.external_page_size == 0 {
            return Err(Error::invalid_argument(
                "external_page_size",
                "must be greater than 0",
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(Error::invalid_argument(
                "max_concurrency",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Configuration for an HTTP-backed page source, loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Collection endpoint
    pub url: String,

    /// Largest page the endpoint will serve
    pub external_page_size: u32,

    /// Cap on concurrent follow-up requests
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,

    /// Response field holding the items
    #[serde(default = "default_items_field")]
    pub items_field: String,

    /// Response field holding the pagination result
    #[serde(default = "default_pagination_field")]
    pub pagination_field: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_page_size_param() -> String {
    "pagesize".to_string()
}

fn default_items_field() -> String {
    "data".to_string()
}

fn default_pagination_field() -> String {
    "pagination".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl SourceConfig {
    /// Create a config for `url` with default field and parameter names
    pub fn new(url: impl Into<String>, external_page_size: u32) -> Self {
        Self {
            url: url.into(),
            external_page_size,
            max_concurrency: None,
            page_param: default_page_param(),
            page_size_param: default_page_size_param(),
            items_field: default_items_field(),
            pagination_field: default_pagination_field(),
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Unsupported URL scheme '{}' (expected http or https)",
                url.scheme()
            )));
        }
        if self.page_param.is_empty() || self.page_size_param.is_empty() {
            return Err(Error::config("Query parameter names must not be empty"));
        }
        if self.page_param == self.page_size_param {
            return Err(Error::config(format!(
                "page_param and page_size_param must differ (both '{}')",
                self.page_param
            )));
        }
        if self.items_field.is_empty() || self.pagination_field.is_empty() {
            return Err(Error::config("Response field names must not be empty"));
        }
        self.aggregator().validate()
    }

    /// The aggregator settings carried by this source
    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            external_page_size: self.external_page_size,
            max_concurrency: self.max_concurrency,
        }
    }

    /// HTTP client settings for this source
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries);
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a source config from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<SourceConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
        .with_context(|| format!("Invalid source file '{}'", path.display()))
}

/// Load and validate a source config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<SourceConfig> {
    let config: SourceConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
