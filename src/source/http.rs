//! HTTP-backed page source
//!
//! Issues `GET {url}?{page_param}=N&{page_size_param}=M` and reads the items
//! and pagination result out of the JSON body.

use super::types::PageSource;
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{FetchedPage, Pagination, PaginationResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Page source reading a paginated JSON collection over HTTP
pub struct HttpPageSource<T> {
    client: HttpClient,
    config: SourceConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    /// Create a source from a validated config
    pub fn new(config: SourceConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self::with_client(client, config))
    }

    /// Create a source sharing an existing client
    pub fn with_client(client: HttpClient, config: SourceConfig) -> Self {
        Self {
            client,
            config,
            _marker: PhantomData,
        }
    }

    /// Get the source config
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn request_for(&self, pagination: Pagination) -> RequestConfig {
        RequestConfig::new()
            .query(&self.config.page_param, pagination.page.to_string())
            .query(&self.config.page_size_param, pagination.page_size.to_string())
    }
}

impl<T: DeserializeOwned> HttpPageSource<T> {
    /// Split a response body into items and pagination result
    pub fn decode_body(&self, mut body: Value) -> Result<FetchedPage<T>> {
        let object = body
            .as_object_mut()
            .ok_or_else(|| Error::decode("Response body is not a JSON object"))?;

        let items = object.remove(&self.config.items_field).ok_or_else(|| {
            Error::decode(format!(
                "Response is missing items field '{}'",
                self.config.items_field
            ))
        })?;
        let pagination = object
            .remove(&self.config.pagination_field)
            .ok_or_else(|| {
                Error::decode(format!(
                    "Response is missing pagination field '{}'",
                    self.config.pagination_field
                ))
            })?;

        let items: Vec<T> = match items {
            Value::Null => Vec::new(),
            other => serde_json::from_value(other)?,
        };
        let pagination: PaginationResult = serde_json::from_value(pagination)?;

        Ok(FetchedPage::new(items, pagination))
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(
        &self,
        cancel: CancellationToken,
        pagination: Pagination,
    ) -> Result<FetchedPage<T>> {
        debug!(
            "GET {} page={} page_size={}",
            self.config.url, pagination.page, pagination.page_size
        );

        let request = self.request_for(pagination);
        let body: Value = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.client.get_json_with_config(&self.config.url, request) => result?,
        };

        self.decode_body(body)
    }
}

impl<T> std::fmt::Debug for HttpPageSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("url", &self.config.url)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
