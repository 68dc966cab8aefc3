//! Tank Test Utilities
//!
//! Shared test infrastructure for the Tank workspace:
//! - Proptest generators for image caches and sort specs
//! - Fixtures: a record builder and pre-seeded stores
//! - Assertions on `TankResult` error kinds

// Re-export the in-memory store from its source crate
pub use tank_storage::{ImageCacheQuery, ImageCacheStore, InMemoryImageCacheStore};

// Re-export core types for convenience
pub use tank_core::{
    ActingUser, ErrorKind, ImageCache, Page, Pagination, PagingSettings, SortDirection,
    SortField, SortSpec, TankError, TankResult, Timestamp, UserRole,
};

use chrono::{DateTime, Duration, Utc};

/// Fixed reference instant so fixture timestamps are reproducible.
pub fn epoch() -> Timestamp {
    DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_else(Utc::now)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Tank types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_sort_direction() -> impl Strategy<Value = SortDirection> {
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
    }

    /// Each of the four fields independently ascending, descending or unset.
    pub fn arb_sort_spec() -> impl Strategy<Value = SortSpec> {
        proptest::collection::vec(proptest::option::of(arb_sort_direction()), 4).prop_map(|dirs| {
            SortSpec::from_pairs(SortField::PRECEDENCE.iter().copied().zip(dirs))
        })
    }

    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (0i64..86_400 * 365).prop_map(|secs| epoch() + Duration::seconds(secs))
    }

    /// Record owned by `user_uuid`, drawn from a small matter pool so
    /// filters hit.
    pub fn arb_image_cache_for(user_uuid: String) -> impl Strategy<Value = ImageCache> {
        (
            "[a-z0-9]{12}",
            prop::sample::select(vec!["m1", "m2", "m3"]),
            -100i64..100,
            0i64..10_000_000,
            arb_timestamp(),
            arb_timestamp(),
        )
            .prop_map(move |(id, matter, sort, size, created, updated)| {
                fixtures::ImageCacheFixture::new(format!("{user_uuid}-{id}"), user_uuid.clone())
                    .matter(matter)
                    .sort(sort)
                    .size(size)
                    .created(created)
                    .updated(updated)
                    .build()
            })
    }

    /// Records spread over several owners, uuids unique.
    pub fn arb_mixed_owner_caches(
        owners: Vec<String>,
        max: usize,
    ) -> impl Strategy<Value = Vec<ImageCache>> {
        proptest::collection::vec(
            prop::sample::select(owners).prop_flat_map(arb_image_cache_for),
            0..max,
        )
        .prop_map(|mut caches| {
            caches.sort_by(|a, b| a.uuid.cmp(&b.uuid));
            caches.dedup_by(|a, b| a.uuid == b.uuid);
            caches
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records and stores for common scenarios.

    use super::*;

    /// Builder for `ImageCache` records.
    #[derive(Debug, Clone)]
    pub struct ImageCacheFixture {
        cache: ImageCache,
    }

    impl ImageCacheFixture {
        pub fn new(uuid: impl Into<String>, user_uuid: impl Into<String>) -> Self {
            let uuid = uuid.into();
            let user_uuid = user_uuid.into();
            let at = epoch();
            Self {
                cache: ImageCache {
                    path: format!("{user_uuid}/cache/{uuid}.png"),
                    username: format!("{user_uuid}-name"),
                    uuid,
                    sort: 0,
                    user_uuid,
                    matter_uuid: "m1".to_string(),
                    matter_name: "photo.png".to_string(),
                    mode: "fit_200_200".to_string(),
                    size: 1024,
                    create_time: at,
                    update_time: at,
                },
            }
        }

        pub fn matter(mut self, matter_uuid: impl Into<String>) -> Self {
            self.cache.matter_uuid = matter_uuid.into();
            self
        }

        pub fn sort(mut self, sort: i64) -> Self {
            self.cache.sort = sort;
            self
        }

        pub fn size(mut self, size: i64) -> Self {
            self.cache.size = size;
            self
        }

        pub fn path(mut self, path: impl Into<String>) -> Self {
            self.cache.path = path.into();
            self
        }

        pub fn created(mut self, at: Timestamp) -> Self {
            self.cache.create_time = at;
            self
        }

        pub fn updated(mut self, at: Timestamp) -> Self {
            self.cache.update_time = at;
            self
        }

        pub fn build(self) -> ImageCache {
            self.cache
        }
    }

    /// Cache `uuid` owned by `user_uuid` with default fields.
    pub fn owned_cache(uuid: &str, user_uuid: &str) -> ImageCache {
        ImageCacheFixture::new(uuid, user_uuid).build()
    }

    pub fn user(uuid: &str) -> ActingUser {
        ActingUser::new(uuid, format!("{uuid}-name"), UserRole::User)
    }

    /// In-memory store holding `records`.
    pub async fn seeded_store(records: &[ImageCache]) -> TankResult<InMemoryImageCacheStore> {
        let store = InMemoryImageCacheStore::new();
        for record in records {
            store.insert(record).await?;
        }
        Ok(store)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on Tank results.

    use super::*;

    pub fn assert_kind<T: std::fmt::Debug>(result: &TankResult<T>, expected: ErrorKind) {
        match result {
            Err(e) => assert_eq!(e.kind(), expected, "unexpected error: {e}"),
            Ok(v) => panic!("Expected {expected:?}, got Ok({v:?})"),
        }
    }

    pub fn assert_not_found<T: std::fmt::Debug>(result: &TankResult<T>) {
        assert_kind(result, ErrorKind::NotFound);
    }

    pub fn assert_unauthorized<T: std::fmt::Debug>(result: &TankResult<T>) {
        assert_kind(result, ErrorKind::Unauthorized);
    }

    pub fn assert_invalid<T: std::fmt::Debug>(result: &TankResult<T>) {
        assert_kind(result, ErrorKind::InvalidArgument);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_defaults() {
        let cache = fixtures::ImageCacheFixture::new("c1", "u1").sort(4).build();
        assert_eq!(cache.user_uuid, "u1");
        assert_eq!(cache.sort, 4);
        assert_eq!(cache.path, "u1/cache/c1.png");
    }

    #[tokio::test]
    async fn test_seeded_store() -> TankResult<()> {
        let store = fixtures::seeded_store(&[
            fixtures::owned_cache("a", "u1"),
            fixtures::owned_cache("b", "u2"),
        ])
        .await?;
        assert_eq!(store.len()?, 2);
        assertions::assert_not_found(&Err::<(), _>(TankError::not_found("x")));
        Ok(())
    }
}
