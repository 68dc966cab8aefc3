//! Image Cache Service
//!
//! Detail, page, delete and batch delete over an `ImageCacheStore`. Every
//! operation that reveals or removes a single record checks ownership with
//! the shared `AccessGuard` first; listings are scoped to the caller by
//! construction of the query.

use std::sync::Arc;

use tank_core::{
    AccessGuard, ActingUser, ImageCache, Page, Pagination, PagingSettings, SortDirection,
    SortField, SortSpec, TankError, TankResult,
};
use tank_storage::{ArtifactRemoval, ArtifactStore, ImageCacheQuery, ImageCacheStore};

use crate::types::PageParams;

impl PageParams {
    /// Sort directions from the `order*` parameters. Anything other than
    /// `ASC`/`DESC` leaves the field unsorted.
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec::from_pairs([
            (SortField::CreateTime, parse_direction(&self.order_create_time)),
            (SortField::UpdateTime, parse_direction(&self.order_update_time)),
            (SortField::Sort, parse_direction(&self.order_sort)),
            (SortField::Size, parse_direction(&self.order_size)),
        ])
    }
}

fn parse_direction(raw: &Option<String>) -> Option<SortDirection> {
    raw.as_deref().and_then(SortDirection::parse)
}

/// Image cache operations on behalf of an acting user.
#[derive(Clone)]
pub struct ImageCacheService {
    store: Arc<dyn ImageCacheStore>,
    artifacts: Arc<dyn ArtifactStore>,
    guard: AccessGuard,
    settings: PagingSettings,
}

impl std::fmt::Debug for ImageCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCacheService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ImageCacheService {
    pub fn new(
        store: Arc<dyn ImageCacheStore>,
        artifacts: Arc<dyn ArtifactStore>,
        settings: PagingSettings,
    ) -> Self {
        Self {
            store,
            artifacts,
            guard: AccessGuard::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &PagingSettings {
        &self.settings
    }

    /// Fetch one record owned by `user`.
    pub async fn detail(&self, uuid: &str, user: &ActingUser) -> TankResult<ImageCache> {
        let uuid = required(uuid, "uuid")?;
        self.fetch_owned(uuid, user).await
    }

    /// One page of `user`'s records, optionally restricted to one matter.
    pub async fn page(&self, params: &PageParams, user: &ActingUser) -> TankResult<Page<ImageCache>> {
        let pagination = Pagination::resolve(
            params.page.as_deref(),
            params.page_size.as_deref(),
            &self.settings,
        )?;

        if user.uuid.is_empty() {
            return Ok(Page::empty(pagination));
        }

        let query = ImageCacheQuery::for_user(
            user.uuid.clone(),
            params.matter_uuid.clone(),
            params.sort_spec(),
            pagination,
        );

        let page = self.store.page(&query).await?;
        tracing::debug!(
            user_uuid = %user.uuid,
            page = page.page,
            returned = page.data.len(),
            total_items = page.total_items,
            "Listed image caches"
        );
        Ok(page)
    }

    /// Remove one record owned by `user`, then its artifact.
    pub async fn delete(&self, uuid: &str, user: &ActingUser) -> TankResult<()> {
        let uuid = required(uuid, "uuid")?;
        let cache = self.fetch_owned(uuid, user).await?;
        self.remove(&cache, user).await
    }

    /// Delete a comma-separated list of records in order.
    ///
    /// Fails fast: the first missing or foreign id aborts the rest, and
    /// records deleted before it stay deleted. Returns the number deleted.
    pub async fn delete_batch(&self, uuids: &str, user: &ActingUser) -> TankResult<usize> {
        let ids = split_batch(uuids)?;

        let mut deleted = 0;
        for uuid in ids {
            let cache = match self.fetch_owned(uuid, user).await {
                Ok(cache) => cache,
                Err(e) => {
                    tracing::debug!(
                        user_uuid = %user.uuid,
                        deleted,
                        "Batch delete aborted"
                    );
                    return Err(e);
                }
            };
            self.remove(&cache, user).await?;
            deleted += 1;
        }

        tracing::info!(user_uuid = %user.uuid, deleted, "Batch delete completed");
        Ok(deleted)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    async fn fetch_owned(&self, uuid: &str, user: &ActingUser) -> TankResult<ImageCache> {
        let cache = self
            .store
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| TankError::not_found(uuid))?;

        if let Err(e) = self.guard.ensure_owner(&cache, user) {
            tracing::warn!(
                user_uuid = %user.uuid,
                image_cache_uuid = %uuid,
                "Image cache access denied"
            );
            return Err(e);
        }

        Ok(cache)
    }

    async fn remove(&self, cache: &ImageCache, user: &ActingUser) -> TankResult<()> {
        if !self.store.delete(cache).await? {
            return Err(TankError::not_found(cache.uuid.clone()));
        }

        let artifact = if cache.path.trim().is_empty() {
            ArtifactRemoval::Skipped
        } else {
            self.artifacts.remove(&cache.path).await
        };

        tracing::info!(
            user_uuid = %user.uuid,
            image_cache_uuid = %cache.uuid,
            ?artifact,
            "Deleted image cache"
        );
        Ok(())
    }
}

/// Blank values are missing; others are returned untouched.
fn required<'a>(value: &'a str, field: &str) -> TankResult<&'a str> {
    if value.trim().is_empty() {
        return Err(TankError::required(field));
    }
    Ok(value)
}

/// Split and trim a batch. Rejects empty input and empty entries.
fn split_batch(raw: &str) -> TankResult<Vec<&str>> {
    let raw = required(raw, "uuids")?;
    let ids: Vec<&str> = raw.split(',').map(str::trim).collect();
    if ids.iter().any(|id| id.is_empty()) {
        return Err(TankError::invalid("uuids", "contains an empty entry"));
    }
    Ok(ids)
}
