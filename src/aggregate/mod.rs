//! Paginated-fetch aggregation
//!
//! Serves a page of any size from a source that caps how many records it
//! returns per call.
//!
//! # Overview
//!
//! 1. The first window (the requested page at the effective page size) is
//!    fetched on the caller's task. Its error, if any, is returned at once.
//! 2. Its total-record count decides how many follow-up windows are needed
//!    ([`planner`]).
//! 3. Follow-ups run concurrently, one task each ([`executor`]).
//! 4. Outcomes are put back in page order, concatenated and trimmed, and the
//!    pagination result is re-expressed in the caller's page size
//!    ([`merger`]).
//!
//! ```rust,ignore
//! use page_aggregator::aggregate::fetch_paginated_external;
//!
//! let cancel = CancellationToken::new();
//! let page = fetch_paginated_external(&cancel, Arc::new(source), Pagination::new(1, 250), 50).await?;
//! assert_eq!(page.pagination.page_size, 250);
//! ```

pub mod executor;
pub mod merger;
pub mod planner;

pub use executor::PageOutcome;
pub use merger::Resequencer;
pub use planner::{FollowUp, RequestPlan};

use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::source::PageSource;
use crate::types::{FetchedPage, Pagination};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fetch `pagination` from `source`, splitting it into windows of at most
/// `external_page_size` records
///
/// Follow-up requests are not bounded in number; use [`Aggregator`] with
/// [`AggregatorConfig::with_max_concurrency`] to cap them.
pub async fn fetch_paginated_external<T, S>(
    cancel: &CancellationToken,
    source: Arc<S>,
    pagination: Pagination,
    external_page_size: u32,
) -> Result<FetchedPage<T>>
where
    T: Send + 'static,
    S: PageSource<T> + ?Sized + 'static,
{
    Aggregator::new(AggregatorConfig::new(external_page_size))
        .fetch(cancel, source, pagination)
        .await
}

/// Aggregates oversized page requests against a capped source
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    /// Create an aggregator
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Get the aggregator config
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fetch `pagination` from `source`
    ///
    /// On success the result holds `min(page_size, total_records)` items in
    /// page order (fewer only if the source returns short pages), with a
    /// pagination result in the caller's page size. On failure nothing
    /// partial is returned: the error is the one the source produced.
    pub async fn fetch<T, S>(
        &self,
        cancel: &CancellationToken,
        source: Arc<S>,
        pagination: Pagination,
    ) -> Result<FetchedPage<T>>
    where
        T: Send + 'static,
        S: PageSource<T> + ?Sized + 'static,
    {
        self.config.validate()?;
        pagination.validate()?;

        let external_page_size = self.config.external_page_size;
        planner::validate_page_range(pagination, external_page_size)?;
        let first = planner::first_request(pagination, external_page_size);
        let first_page = source.fetch(cancel.clone(), first.pagination).await?;
        let total_records = first_page.pagination.total_records;

        let follow_up = planner::plan_follow_ups(
            pagination,
            external_page_size,
            total_records,
            first_page.len(),
        )?;

        let items = match follow_up {
            FollowUp::PassThrough => return Ok(first_page),
            FollowUp::Truncate { take } => {
                let mut items = first_page.items;
                items.truncate(take);
                items
            }
            FollowUp::Fetch { requests, take } => {
                debug!(
                    "Page {} (size {}) needs {} follow-up requests of up to {} records",
                    pagination.page,
                    pagination.page_size,
                    requests.len(),
                    first.pagination.page_size
                );
                let outcomes =
                    executor::fan_out(source, cancel, requests, self.config.max_concurrency)
                        .await?;

                let mut resequencer = Resequencer::new(first_page.items, take);
                resequencer.extend(outcomes);
                resequencer.finish()?
            }
        };

        info!(
            "Aggregated {} of {} records for page {} (size {})",
            items.len(),
            total_records,
            pagination.page,
            pagination.page_size
        );

        Ok(FetchedPage::new(
            items,
            merger::final_pagination(pagination, total_records),
        ))
    }
}
