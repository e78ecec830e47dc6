//! Pagination value types
//!
//! Immutable descriptors of a requested page window and of a data source's
//! reported totals. These travel by value between callers, page sources and
//! the aggregator, and serialize with the same field names upstream services
//! use on the wire.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Pagination
// ============================================================================

/// A requested page window: a 1-based page number and a page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: u32,
    /// Records per page
    pub page_size: u32,
}

impl Pagination {
    /// Create a new pagination window
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Check that the window is addressable (`page >= 1`, `page_size >= 1`)
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::invalid_argument("page", "must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_argument("page_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Zero-based index of the first record covered by this window
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Render as the upstream query string, e.g. `page=2&pagesize=50`
    pub fn url_query(&self) -> String {
        format!("page={}&pagesize={}", self.page, self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

// ============================================================================
// PaginationResult
// ============================================================================

/// A source's accounting of a fetch: the window served plus total counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page: u32,
    pub page_size: u32,
    pub total_records: u64,
    pub total_pages: u64,
}

impl PaginationResult {
    /// Build a result whose `total_pages` is derived from `page_size`
    pub fn new(page: u32, page_size: u32, total_records: u64) -> Self {
        Self {
            page,
            page_size,
            total_records,
            total_pages: total_pages(total_records, page_size),
        }
    }

    /// Check that `total_pages == ceil(total_records / page_size)`
    pub fn is_consistent(&self) -> bool {
        self.total_pages == total_pages(self.total_records, self.page_size)
    }
}

/// `ceil(total_records / page_size)`, or 0 for an empty page size
pub fn total_pages(total_records: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(u64::from(page_size))
}

// ============================================================================
// Fetched pages
// ============================================================================

/// One page of items together with its pagination accounting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage<T> {
    pub items: Vec<T>,
    pub pagination: PaginationResult,
}

impl<T> FetchedPage<T> {
    /// Create a fetched page
    pub fn new(items: Vec<T>, pagination: PaginationResult) -> Self {
        Self { items, pagination }
    }

    /// The zero value returned alongside errors
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            pagination: PaginationResult::default(),
        }
    }

    /// Number of items on the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert into the serialized response shape
    pub fn into_envelope(self) -> PageEnvelope<T> {
        PageEnvelope {
            data: self.items,
            pagination: self.pagination,
        }
    }
}

/// Serialized shape of a paginated collection response
///
/// ```json
/// { "data": [...], "pagination": { "page": 1, "page_size": 25, "total_records": 97, "total_pages": 4 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub pagination: PaginationResult,
}

impl<T> From<PageEnvelope<T>> for FetchedPage<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        Self {
            items: envelope.data,
            pagination: envelope.pagination,
        }
    }
}
