//! Request and response types for the image cache endpoints.
//!
//! Request fields are all optional strings: the endpoints take form values,
//! and validation happens in the service so every missing or malformed
//! value gets the same error shape.

use serde::{Deserialize, Serialize};
use tank_core::{ImageCache, Page};

/// Parameters of `/detail` and `/delete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UuidParams {
    /// Image cache uuid
    pub uuid: Option<String>,
}

/// Parameters of `/delete/batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UuidsParams {
    /// Comma-separated image cache uuids, processed in order
    pub uuids: Option<String>,
}

/// Parameters of `/page`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Zero-based page number (default 0)
    pub page: Option<String>,
    /// Page size (default 200, clamped to the configured maximum)
    pub page_size: Option<String>,
    /// Restrict to caches of one matter
    pub matter_uuid: Option<String>,
    /// `ASC` or `DESC`
    pub order_create_time: Option<String>,
    /// `ASC` or `DESC`
    pub order_update_time: Option<String>,
    /// `ASC` or `DESC`
    pub order_sort: Option<String>,
    /// `ASC` or `DESC`
    pub order_size: Option<String>,
}

/// One page of the caller's image caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ImageCachePageResponse {
    pub page: i64,
    pub page_size: i64,
    /// Matching records across all pages
    pub total_items: i64,
    pub total_pages: i64,
    pub data: Vec<ImageCache>,
}

impl From<Page<ImageCache>> for ImageCachePageResponse {
    fn from(page: Page<ImageCache>) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            data: page.data,
        }
    }
}

/// Result of a batch delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteImageCacheResponse {
    /// Number of records removed
    pub deleted: usize,
}
