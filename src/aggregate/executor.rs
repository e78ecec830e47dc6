//! Fan-out execution of follow-up requests
//!
//! Every follow-up request runs as its own task. Tasks publish exactly one
//! [`PageOutcome`] each to a shared channel, and the executor joins all of
//! them before handing the outcomes back in completion order. A failing
//! task never cancels its siblings.

use super::planner::RequestPlan;
use crate::error::{Error, Result};
use crate::source::PageSource;
use crate::types::{FetchedPage, Pagination};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The result of one follow-up request, tagged with its ordinal
#[derive(Debug)]
pub struct PageOutcome<T> {
    /// Slot in the merged output
    pub ordinal: usize,
    /// Window that was requested
    pub pagination: Pagination,
    /// What the source returned
    pub result: Result<FetchedPage<T>>,
}

/// Run `requests` concurrently and wait for all of them
///
/// With `max_concurrency` set, at most that many fetches are in flight at
/// once; otherwise every request starts immediately. The returned outcomes
/// are in completion order. A task that panics is reported as
/// [`Error::TaskFailed`] once every task has finished.
pub async fn fan_out<T, S>(
    source: Arc<S>,
    cancel: &CancellationToken,
    requests: Vec<RequestPlan>,
    max_concurrency: Option<usize>,
) -> Result<Vec<PageOutcome<T>>>
where
    T: Send + 'static,
    S: PageSource<T> + ?Sized + 'static,
{
    let expected = requests.len();
    let (tx, mut rx) = mpsc::channel(expected.max(1));
    let limiter = max_concurrency.map(|limit| Arc::new(Semaphore::new(limit)));
    let mut tasks = JoinSet::new();

    debug!(
        "Fanning out {} requests (max concurrency: {:?})",
        expected, max_concurrency
    );

    for request in &requests {
        let request = *request;
        let tx = tx.clone();
        let source = Arc::clone(&source);
        let cancel = cancel.clone();
        let limiter = limiter.clone();

        tasks.spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let result = source.fetch(cancel, request.pagination).await;
            if let Err(e) = &result {
                warn!("Fetch of {} failed: {}", request.pagination.url_query(), e);
            }

            // the receiver is held until every task has been joined
            let _ = tx
                .send(PageOutcome {
                    ordinal: request.ordinal,
                    pagination: request.pagination,
                    result,
                })
                .await;
        });
    }
    drop(tx);

    let mut join_failure = None;
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("Fetch task did not complete: {}", e);
            join_failure.get_or_insert_with(|| e.to_string());
        }
    }

    let mut outcomes = Vec::with_capacity(expected);
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }

    if let Some(message) = join_failure {
        let missing = requests
            .iter()
            .find(|r| !outcomes.iter().any(|o| o.ordinal == r.ordinal))
            .map_or(0, |r| r.pagination.page);
        return Err(Error::TaskFailed {
            page: missing,
            message,
        });
    }

    Ok(outcomes)
}
