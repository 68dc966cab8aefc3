//! Property-Based Tests for Image Cache Ownership
//!
//! For any set of records spread over several owners:
//! - a page lists exactly the caller's records, in the requested order;
//! - detail succeeds for the caller's records and is denied for others;
//! - a batch naming a foreign record leaves that record in place.

use std::sync::Arc;

use proptest::prelude::*;
use tank_api::{ImageCacheService, PageParams};
use tank_core::{ErrorKind, ImageCache, PagingSettings, SortDirection, SortField, SortSpec};
use tank_storage::NoopArtifactStore;
use tank_test_utils::fixtures::{seeded_store, user};
use tank_test_utils::generators::{arb_mixed_owner_caches, arb_sort_spec};
use tokio::runtime::Runtime;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

const OWNERS: [&str; 3] = ["alice", "bob", "carol"];

fn owners() -> Vec<String> {
    OWNERS.iter().map(|o| o.to_string()).collect()
}

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

async fn service_over(records: &[ImageCache]) -> Result<ImageCacheService, TestCaseError> {
    let store = seeded_store(records)
        .await
        .map_err(|e| TestCaseError::fail(format!("Failed to seed store: {}", e)))?;
    Ok(ImageCacheService::new(
        Arc::new(store),
        Arc::new(NoopArtifactStore),
        PagingSettings::default(),
    ))
}

fn direction_param(spec: &SortSpec, field: SortField) -> Option<String> {
    spec.direction(field).map(|d| match d {
        SortDirection::Asc => "ASC".to_string(),
        SortDirection::Desc => "DESC".to_string(),
    })
}

fn params_for(spec: &SortSpec, matter: Option<&str>, page_size: i64) -> PageParams {
    PageParams {
        page_size: Some(page_size.to_string()),
        matter_uuid: matter.map(str::to_string),
        order_create_time: direction_param(spec, SortField::CreateTime),
        order_update_time: direction_param(spec, SortField::UpdateTime),
        order_sort: direction_param(spec, SortField::Sort),
        order_size: direction_param(spec, SortField::Size),
        ..Default::default()
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Walking every page yields exactly the caller's records in the
    /// requested matter, sorted.
    #[test]
    fn prop_pages_partition_callers_records(
        records in arb_mixed_owner_caches(owners(), 40),
        spec in arb_sort_spec(),
        matter in prop::option::of(prop::sample::select(vec!["m1", "m2", "m3"])),
        page_size in 1i64..8,
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let service = service_over(&records).await?;
            let caller = user("alice");

            let mut expected: Vec<ImageCache> = records
                .iter()
                .filter(|c| c.user_uuid == "alice")
                .filter(|c| matter.map_or(true, |m| c.matter_uuid == m))
                .cloned()
                .collect();
            expected.sort_by(|a, b| spec.compare(a, b));

            let mut params = params_for(&spec, matter, page_size);
            let mut seen = Vec::new();
            let mut page_no = 0;
            loop {
                params.page = Some(page_no.to_string());
                let page = service
                    .page(&params, &caller)
                    .await
                    .map_err(|e| TestCaseError::fail(format!("page failed: {}", e)))?;
                prop_assert_eq!(page.total_items, expected.len() as i64);
                prop_assert!(page.data.len() as i64 <= page_size);
                prop_assert!(page.data.iter().all(|c| c.user_uuid == "alice"));
                if page.data.is_empty() {
                    break;
                }
                seen.extend(page.data);
                page_no += 1;
            }

            prop_assert_eq!(seen, expected);
            Ok(())
        })?;
    }

    /// Detail is granted exactly to the owner.
    #[test]
    fn prop_detail_only_for_owner(
        records in arb_mixed_owner_caches(owners(), 20),
        caller in prop::sample::select(OWNERS.to_vec()),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let service = service_over(&records).await?;
            let acting = user(caller);

            for record in &records {
                let result = service.detail(&record.uuid, &acting).await;
                if record.user_uuid == caller {
                    let got = result.ok();
                    prop_assert_eq!(got.as_ref(), Some(record));
                } else {
                    let kind = result.err().map(|e| e.kind());
                    prop_assert_eq!(kind, Some(ErrorKind::Unauthorized));
                }
            }
            Ok(())
        })?;
    }

    /// A foreign record in a batch survives, and so does everything after it.
    #[test]
    fn prop_batch_never_deletes_foreign_records(
        records in arb_mixed_owner_caches(owners(), 20),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let service = service_over(&records).await?;
            let caller = user("alice");

            let batch: Vec<&str> = records.iter().map(|c| c.uuid.as_str()).collect();
            prop_assume!(!batch.is_empty());
            let result = service.delete_batch(&batch.join(","), &caller).await;

            let first_foreign = records.iter().position(|c| c.user_uuid != "alice");
            match first_foreign {
                None => prop_assert_eq!(result.ok(), Some(records.len())),
                Some(stop) => {
                    let kind = result.err().map(|e| e.kind());
                    prop_assert_eq!(kind, Some(ErrorKind::Unauthorized));
                    for (i, record) in records.iter().enumerate() {
                        let still_there = service
                            .detail(&record.uuid, &user(&record.user_uuid))
                            .await
                            .is_ok();
                        prop_assert_eq!(still_there, i >= stop);
                    }
                }
            }
            Ok(())
        })?;
    }
}

#[tokio::test]
async fn test_empty_caller_sees_nothing() -> Result<(), TestCaseError> {
    let records = vec![
        tank_test_utils::fixtures::owned_cache("a1", "alice"),
        tank_test_utils::fixtures::owned_cache("b1", "bob"),
    ];
    let service = service_over(&records).await?;
    let anonymous = user("");

    let page = service
        .page(&PageParams::default(), &anonymous)
        .await
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    assert_eq!(page.total_items, 0);
    assert!(page.data.is_empty());

    let denied = service.detail("a1", &anonymous).await;
    assert_eq!(denied.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    Ok(())
}
