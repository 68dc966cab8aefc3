//! In-memory image cache store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ::async_trait::async_trait;
use tank_core::{ImageCache, Page, StorageError, TankResult};

use crate::{ImageCacheQuery, ImageCacheStore};

/// Store backed by a `HashMap` behind an `RwLock`.
///
/// Used by tests and by deployments started with `TANK_STORE=memory`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryImageCacheStore {
    caches: Arc<RwLock<HashMap<String, ImageCache>>>,
}

impl InMemoryImageCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> TankResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> TankResult<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn contains(&self, uuid: &str) -> TankResult<bool> {
        Ok(self.read()?.contains_key(uuid))
    }

    /// Clear all stored data.
    pub fn clear(&self) -> TankResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> TankResult<RwLockReadGuard<'_, HashMap<String, ImageCache>>> {
        self.caches.read().map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> TankResult<RwLockWriteGuard<'_, HashMap<String, ImageCache>>> {
        self.caches.write().map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[async_trait]
impl ImageCacheStore for InMemoryImageCacheStore {
    async fn find_by_uuid(&self, uuid: &str) -> TankResult<Option<ImageCache>> {
        Ok(self.read()?.get(uuid).cloned())
    }

    async fn page(&self, query: &ImageCacheQuery) -> TankResult<Page<ImageCache>> {
        let mut matched: Vec<ImageCache> = self
            .read()?
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        let total = matched.len() as i64;

        let sort = query.sort();
        matched.sort_by(|a, b| sort.compare(a, b));

        let pagination = query.pagination();
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
        let data = matched.into_iter().skip(offset).take(limit).collect();

        Ok(Page::new(pagination, total, data))
    }

    async fn delete(&self, cache: &ImageCache) -> TankResult<bool> {
        Ok(self.write()?.remove(&cache.uuid).is_some())
    }

    async fn insert(&self, cache: &ImageCache) -> TankResult<()> {
        let mut caches = self.write()?;
        if caches.contains_key(&cache.uuid) {
            return Err(StorageError::InsertFailed {
                uuid: cache.uuid.clone(),
                reason: "already exists".to_string(),
            }
            .into());
        }
        caches.insert(cache.uuid.clone(), cache.clone());
        Ok(())
    }
}
