//! Page source trait and the closure adapter

use crate::error::Result;
use crate::types::{FetchedPage, Pagination};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Fetches one page window from a data source
///
/// Implementations must be safe to call concurrently with different
/// `Pagination` values; the aggregator fans follow-up requests out across
/// tasks sharing one source. The token is the caller's: a source that
/// observes it can stop early, but nothing requires it to.
#[async_trait]
pub trait PageSource<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Fetch the records for exactly `pagination`
    async fn fetch(&self, cancel: CancellationToken, pagination: Pagination)
        -> Result<FetchedPage<T>>;
}

/// A [`PageSource`] backed by an async closure
#[derive(Clone)]
pub struct FnSource<F> {
    f: F,
}

/// Wrap an async closure as a [`PageSource`]
///
/// ```rust,ignore
/// let source = source_fn(|_cancel, pagination: Pagination| async move {
///     let items = repo.list(pagination.offset(), pagination.page_size).await?;
///     Ok(FetchedPage::new(items, PaginationResult::new(pagination.page, pagination.page_size, total)))
/// });
/// ```
pub fn source_fn<T, F, Fut>(f: F) -> FnSource<F>
where
    F: Fn(CancellationToken, Pagination) -> Fut,
    Fut: Future<Output = Result<FetchedPage<T>>>,
{
    FnSource { f }
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(CancellationToken, Pagination) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchedPage<T>>> + Send,
{
    async fn fetch(
        &self,
        cancel: CancellationToken,
        pagination: Pagination,
    ) -> Result<FetchedPage<T>> {
        (self.f)(cancel, pagination).await
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}
