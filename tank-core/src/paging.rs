//! Page arithmetic for listing operations.

use serde::{Deserialize, Serialize};

use crate::error::{TankError, TankResult};

/// Page size used when the caller supplies none (or garbage).
pub const DEFAULT_PAGE_SIZE: i64 = 200;

/// Upper bound applied to caller-supplied page sizes.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Paging limits, configurable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingSettings {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// A validated, zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Pagination {
    /// `page >= 0` and `page_size >= 1`, or `InvalidArgument`.
    pub fn new(page: i64, page_size: i64) -> TankResult<Self> {
        if page < 0 {
            return Err(TankError::invalid("page", "must not be negative"));
        }
        if page_size < 1 {
            return Err(TankError::invalid("pageSize", "must be at least 1"));
        }
        Ok(Self { page, page_size })
    }

    /// Resolve raw request values.
    ///
    /// Absent or unparsable `page` becomes 0 and absent or unparsable
    /// `page_size` becomes the configured default. Parsed values are still
    /// range-checked, and a page size above the maximum is clamped.
    pub fn resolve(
        page: Option<&str>,
        page_size: Option<&str>,
        settings: &PagingSettings,
    ) -> TankResult<Self> {
        let page = parse_or(page, 0);
        let page_size = parse_or(page_size, settings.default_page_size);
        let max = settings.max_page_size.max(1);
        Self::new(page, page_size.min(max))
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

fn parse_or(raw: Option<&str>, fallback: i64) -> i64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(fallback)
}

/// One page of results plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(pagination: Pagination, total_items: i64, data: Vec<T>) -> Self {
        let size = pagination.page_size();
        let total_items = total_items.max(0);
        Self {
            page: pagination.page(),
            page_size: size,
            total_items,
            total_pages: (total_items + size - 1) / size,
            data,
        }
    }

    pub fn empty(pagination: Pagination) -> Self {
        Self::new(pagination, 0, Vec::new())
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
