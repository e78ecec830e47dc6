//! Request planning
//!
//! Decides which sub-requests satisfy a requested page against a source that
//! serves at most `external_page_size` records per call.
//!
//! Follow-up page numbers count up from the requested page in units of the
//! effective page size. This only addresses the right records when the
//! source numbers its pages as consecutive windows of exactly that size; an
//! offset or cursor based source needs a different planner.

use crate::error::{Error, Result};
use crate::types::Pagination;

/// One sub-request and the slot its records occupy in the merged output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPlan {
    /// Window to ask the source for
    pub pagination: Pagination,
    /// Position in the merged sequence; 0 is the synchronous first request
    pub ordinal: usize,
}

/// What to do once the first page has come back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// The request fit in one source page; the first response is the answer
    PassThrough,
    /// The first page already covers the request; keep its first `take` items
    Truncate { take: usize },
    /// Issue `requests` concurrently and keep `take` items overall
    Fetch {
        requests: Vec<RequestPlan>,
        take: usize,
    },
}

/// The smaller of the requested and the external page size
pub fn effective_page_size(requested: Pagination, external_page_size: u32) -> u32 {
    requested.page_size.min(external_page_size)
}

/// The ordinal-0 request, always issued
pub fn first_request(requested: Pagination, external_page_size: u32) -> RequestPlan {
    RequestPlan {
        pagination: Pagination::new(
            requested.page,
            effective_page_size(requested, external_page_size),
        ),
        ordinal: 0,
    }
}

/// Reject requests whose follow-up pages would run past `u32::MAX`
///
/// Assumes full windows; a short first page can still push the plan further,
/// which [`plan_follow_ups`] catches.
pub fn validate_page_range(requested: Pagination, external_page_size: u32) -> Result<()> {
    let page_size = effective_page_size(requested, external_page_size);
    if page_size == 0 || requested.page_size <= page_size {
        return Ok(());
    }

    let follow_ups = u64::from(requested.page_size - page_size).div_ceil(u64::from(page_size));
    if u64::from(requested.page) + follow_ups > u64::from(u32::MAX) {
        return Err(Error::invalid_argument(
            "page",
            format!(
                "page {} of size {} needs follow-up pages past u32::MAX",
                requested.page, requested.page_size
            ),
        ));
    }
    Ok(())
}

/// Plan the follow-up requests from the first response's counts
pub fn plan_follow_ups(
    requested: Pagination,
    external_page_size: u32,
    total_records: u64,
    first_len: usize,
) -> Result<FollowUp> {
    if requested.page_size <= external_page_size {
        return Ok(FollowUp::PassThrough);
    }

    // never fetch more than exists
    let take = u64::from(requested.page_size).min(total_records) as usize;
    if first_len >= take {
        return Ok(FollowUp::Truncate { take });
    }

    let page_size = effective_page_size(requested, external_page_size) as usize;
    let mut remaining = take - first_len;
    let mut requests = Vec::with_capacity(remaining.div_ceil(page_size));
    let mut page = requested.page;

    while remaining > 0 {
        page = page.checked_add(1).ok_or_else(|| {
            Error::invalid_argument("page", "follow-up page number exceeds u32::MAX")
        })?;
        let size = remaining.min(page_size);
        requests.push(RequestPlan {
            pagination: Pagination::new(page, size as u32),
            ordinal: requests.len() + 1,
        });
        remaining -= size;
    }

    Ok(FollowUp::Fetch { requests, take })
}

/// Full request plan against a source that serves consecutive full windows
///
/// Assumes the first response holds every record of its window that exists,
/// which is what a well-behaved source returns. Useful for previewing the
/// fan-out a request will cause without touching the source.
pub fn plan_for_total(
    requested: Pagination,
    external_page_size: u32,
    total_records: u64,
) -> Result<Vec<RequestPlan>> {
    requested.validate()?;
    if external_page_size == 0 {
        return Err(Error::invalid_argument(
            "external_page_size",
            "must be greater than 0",
        ));
    }
    validate_page_range(requested, external_page_size)?;

    let first = first_request(requested, external_page_size);
    let available = total_records.saturating_sub(first.pagination.offset());
    let first_len = available.min(u64::from(first.pagination.page_size)) as usize;

    let mut plan = vec![first];
    if let FollowUp::Fetch { requests, .. } =
        plan_follow_ups(requested, external_page_size, total_records, first_len)?
    {
        plan.extend(requests);
    }
    Ok(plan)
}
