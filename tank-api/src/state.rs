//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use tank_core::PagingSettings;
use tank_storage::{ArtifactStore, ImageCacheStore};

use crate::db::DbClient;
use crate::services::ImageCacheService;

/// Application-wide state shared across all routes.
#[derive(Clone, Debug)]
pub struct AppState {
    pub image_caches: ImageCacheService,
    /// Present when records live in PostgreSQL; drives the readiness probe.
    pub db: Option<DbClient>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(image_caches: ImageCacheService, db: Option<DbClient>) -> Self {
        Self {
            image_caches,
            db,
            start_time: Instant::now(),
        }
    }

    /// State over a PostgreSQL store.
    pub fn with_database(
        db: DbClient,
        artifacts: Arc<dyn ArtifactStore>,
        paging: PagingSettings,
    ) -> Self {
        let service = ImageCacheService::new(Arc::new(db.clone()), artifacts, paging);
        Self::new(service, Some(db))
    }

    /// State over any other store (in-memory, test doubles).
    pub fn with_store(
        store: Arc<dyn ImageCacheStore>,
        artifacts: Arc<dyn ArtifactStore>,
        paging: PagingSettings,
    ) -> Self {
        Self::new(ImageCacheService::new(store, artifacts, paging), None)
    }
}

crate::impl_from_ref!(ImageCacheService, image_caches);
crate::impl_from_ref!(Option<DbClient>, db);
crate::impl_from_ref!(Instant, start_time);
