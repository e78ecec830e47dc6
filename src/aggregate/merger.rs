//! Resequencing and merging of fan-out outcomes
//!
//! Outcomes arrive in whatever order their tasks finished. The
//! [`Resequencer`] restores ordinal order, concatenates the pages behind the
//! first one, and trims the result to the planned size.

use super::executor::PageOutcome;
use crate::error::Result;
use crate::types::{Pagination, PaginationResult};
use tracing::warn;

/// Collects follow-up outcomes behind the first page's items
#[derive(Debug)]
pub struct Resequencer<T> {
    first: Vec<T>,
    take: usize,
    outcomes: Vec<PageOutcome<T>>,
}

impl<T> Resequencer<T> {
    /// Start from the ordinal-0 items, keeping at most `take` items overall
    pub fn new(first: Vec<T>, take: usize) -> Self {
        Self {
            first,
            take,
            outcomes: Vec::new(),
        }
    }

    /// Add one outcome, in any order
    ///
    /// Ordinals only need to be distinct; gaps are allowed.
    pub fn push(&mut self, outcome: PageOutcome<T>) {
        self.outcomes.push(outcome);
    }

    /// Add outcomes in the order they completed
    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = PageOutcome<T>>) {
        self.outcomes.extend(outcomes);
    }

    /// Merge into one ordered sequence
    ///
    /// If any outcome failed, the first failure pushed is returned and every
    /// other result is discarded.
    pub fn finish(self) -> Result<Vec<T>> {
        let mut pages = Vec::with_capacity(self.outcomes.len());
        let mut first_error = None;

        for outcome in self.outcomes {
            match outcome.result {
                Ok(page) => pages.push((outcome.ordinal, page.items)),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => warn!(
                    "Discarding additional failure for page {}: {}",
                    outcome.pagination.page, e
                ),
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        pages.sort_by_key(|(ordinal, _)| *ordinal);

        let available = self.first.len() + pages.iter().map(|(_, items)| items.len()).sum::<usize>();
        let mut merged = Vec::with_capacity(available.min(self.take));
        merged.extend(self.first);
        for (_, items) in pages {
            merged.extend(items);
        }
        merged.truncate(self.take);

        Ok(merged)
    }
}

/// Pagination result expressed in the caller's page size
pub fn final_pagination(requested: Pagination, total_records: u64) -> PaginationResult {
    PaginationResult::new(requested.page, requested.page_size, total_records)
}
