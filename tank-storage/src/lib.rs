//! Tank Storage - Image Cache Persistence
//!
//! Defines the async `ImageCacheStore` trait every backend implements, the
//! owner-scoped `ImageCacheQuery` used for listings, and the artifact
//! stores that remove the derived files a record points to.

pub mod artifact;
pub mod memory;

use ::async_trait::async_trait;
use tank_core::{ImageCache, Page, Pagination, SortSpec, TankResult};

pub use artifact::{ArtifactRemoval, ArtifactStore, LocalArtifactStore, NoopArtifactStore};
pub use memory::InMemoryImageCacheStore;

// ============================================================================
// QUERY
// ============================================================================

/// Listing query. Always scoped to one owner; no constructor exists
/// without a `user_uuid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCacheQuery {
    user_uuid: String,
    matter_uuid: Option<String>,
    sort: SortSpec,
    pagination: Pagination,
}

impl ImageCacheQuery {
    /// Build a query over `user_uuid`'s records. An empty `matter_uuid`
    /// is treated as absent.
    pub fn for_user(
        user_uuid: impl Into<String>,
        matter_uuid: Option<String>,
        sort: SortSpec,
        pagination: Pagination,
    ) -> Self {
        Self {
            user_uuid: user_uuid.into(),
            matter_uuid: matter_uuid.filter(|m| !m.trim().is_empty()),
            sort,
            pagination,
        }
    }

    pub fn user_uuid(&self) -> &str {
        &self.user_uuid
    }

    pub fn matter_uuid(&self) -> Option<&str> {
        self.matter_uuid.as_deref()
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Whether `cache` falls inside this query's filter.
    pub fn matches(&self, cache: &ImageCache) -> bool {
        cache.is_owned_by(&self.user_uuid)
            && self
                .matter_uuid
                .as_deref()
                .map_or(true, |m| cache.matter_uuid == m)
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Async persistence for image cache records.
#[async_trait]
pub trait ImageCacheStore: Send + Sync {
    /// Fetch one record. `Ok(None)` when absent.
    async fn find_by_uuid(&self, uuid: &str) -> TankResult<Option<ImageCache>>;

    /// Count and fetch one page of the query's owner-scoped records.
    async fn page(&self, query: &ImageCacheQuery) -> TankResult<Page<ImageCache>>;

    /// Remove a record. Returns `false` if it was already gone.
    async fn delete(&self, cache: &ImageCache) -> TankResult<bool>;

    /// Insert a new record; a duplicate uuid is an `InsertFailed` error.
    async fn insert(&self, cache: &ImageCache) -> TankResult<()>;
}
