//! Property-based tests for status classification and builders.
//!
//! Uses proptest to check that the classification table holds for every
//! status code and that builder steps behave as last-write-wins.

use crate::common::*;
use item_ops::config::RetryConfig;
use item_ops::executor::ItemOperations;
use item_ops::operations::{ConcurrentReplaceBuilder, CreateBuilder, ReplaceBuilder};
use item_ops::results::{ConcurrentReplaceResult, CreateResult, ReplaceResult};
use item_ops::store::{PartitionKey, StoreError, status};
use item_ops::version::ETag;
use proptest::prelude::*;

const CREATE_STATUSES: [u16; 5] = [
    status::BAD_REQUEST,
    status::FORBIDDEN,
    status::CONFLICT,
    status::PAYLOAD_TOO_LARGE,
    status::TOO_MANY_REQUESTS,
];

const REPLACE_STATUSES: [u16; 5] = [
    status::BAD_REQUEST,
    status::NOT_FOUND,
    status::PRECONDITION_FAILED,
    status::PAYLOAD_TOO_LARGE,
    status::TOO_MANY_REQUESTS,
];

/// Status codes weighted towards the ones the tables name.
fn status_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        3 => prop::sample::select(vec![400u16, 403, 404, 409, 412, 413, 429]),
        1 => 100u16..600,
    ]
}

proptest! {
    #[test]
    fn test_create_classification_matches_table(code in status_strategy(), body in "[a-z ]{0,20}") {
        let classified = CreateResult::<Counter>::classify(StoreError::response(code, body.clone()));

        prop_assert_eq!(classified.is_ok(), CREATE_STATUSES.contains(&code));
        if let Err(unclassified) = classified {
            prop_assert_eq!(unclassified.status(), Some(code));
            prop_assert_eq!(unclassified.body(), Some(body.as_str()));
        }
    }

    #[test]
    fn test_replace_classification_matches_table(code in status_strategy()) {
        let classified = ReplaceResult::<Counter>::classify(StoreError::response(code, "body"));
        prop_assert_eq!(classified.is_ok(), REPLACE_STATUSES.contains(&code));
    }

    #[test]
    fn test_concurrent_classification_agrees_with_replace(code in status_strategy()) {
        let plain = ReplaceResult::<Counter>::classify(StoreError::response(code, "body"));
        let concurrent =
            ConcurrentReplaceResult::<Counter, String>::classify(StoreError::response(code, "body"));

        match (plain, concurrent) {
            (Ok(plain), Ok(concurrent)) => {
                prop_assert_eq!(ConcurrentReplaceResult::from(plain), concurrent);
            }
            (Err(_), Err(_)) => {}
            (plain, concurrent) => {
                prop_assert!(false, "Disagreement on {}: {:?} vs {:?}", code, plain, concurrent);
            }
        }
    }

    #[test]
    fn test_classified_results_are_never_success(code in 100u16..600) {
        if let Ok(result) = ReplaceResult::<Counter>::classify(StoreError::response(code, "")) {
            prop_assert!(!result.is_success());
        }
        if let Ok(result) = CreateResult::<Counter>::classify(StoreError::response(code, "")) {
            prop_assert!(!result.is_success());
        }
    }
}

proptest! {
    #[test]
    fn test_builder_last_write_wins(
        ids in prop::collection::vec("[a-z0-9]{1,8}", 1..5),
        keys in prop::collection::vec("[a-z]{1,8}", 1..5),
        etags in prop::collection::vec("[a-f0-9]{4,12}", 1..5),
        counts in prop::collection::vec(0u64..1_000, 1..5),
    ) {
        let mut builder = ReplaceBuilder::new();
        for id in &ids {
            builder = builder.id(id.as_str());
        }
        for key in &keys {
            builder = builder.partition_key(key.as_str());
        }
        for etag in &etags {
            builder = builder.if_match_etag(etag.as_str());
        }
        for count in &counts {
            builder = builder.item(counter("c", *count));
        }
        let op = builder.build();

        prop_assert_eq!(&op.id, ids.last().unwrap());
        prop_assert_eq!(op.partition_key.clone(), Some(PartitionKey::from(keys.last().unwrap().as_str())));
        prop_assert_eq!(op.if_match_etag(), Some(&ETag::new(etags.last().unwrap().as_str())));
        prop_assert_eq!(op.item.count, *counts.last().unwrap());
    }

    #[test]
    fn test_create_builder_keeps_content_flag(returning in any::<bool>(), key in "[a-z]{1,8}") {
        let builder = if returning {
            CreateBuilder::returning_content()
        } else {
            CreateBuilder::new()
        };
        let op = builder
            .item(counter("c", 0))
            .partition_key(key.as_str())
            .request_options(Default::default())
            .build();

        prop_assert_eq!(op.request_options.enable_content_response_on_write, returning);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_conflicts_within_budget_always_succeed(conflicts in 0u32..6, headroom in 1u32..4) {
        tokio_test::block_on(async {
            let budget = conflicts + headroom;
            let mut store = ScriptedStore::new();
            for n in 0..conflicts {
                store = store
                    .on_read(read_ok("c1", n as u64, &format!("v{}", n)))
                    .on_replace(precondition_failed());
            }
            store = store
                .on_read(read_ok("c1", conflicts as u64, "last"))
                .on_replace(written(status::OK, "next"));

            let op = ConcurrentReplaceBuilder::<Counter, String>::new()
                .id("c1")
                .update(|mut c: Counter, _| async move {
                    c.count += 1;
                    Ok(c)
                })
                .build();

            let response = store
                .replace_concurrently_with(op, &RetryConfig::new().with_max_retry_count(budget), &no_cancel())
                .await
                .unwrap();

            assert_eq!(response.attempts, conflicts + 1);
            assert_eq!(store.read_count() as u32, conflicts + 1);
            assert_eq!(
                response.result.into_success().map(|c| c.count),
                Some(conflicts as u64 + 1)
            );
        });
    }

    #[test]
    fn test_conflicts_beyond_budget_give_up(budget in 1u32..6) {
        tokio_test::block_on(async {
            let mut store = ScriptedStore::new();
            for n in 0..budget {
                store = store
                    .on_read(read_ok("c1", n as u64, &format!("v{}", n)))
                    .on_replace(precondition_failed());
            }

            let op = ConcurrentReplaceBuilder::<Counter, String>::new()
                .id("c1")
                .update(|c: Counter, _| async move { Ok(c) })
                .build();

            let response = store
                .replace_concurrently_with(op, &RetryConfig::new().with_max_retry_count(budget), &no_cancel())
                .await
                .unwrap();

            assert!(matches!(response.result, ConcurrentReplaceResult::ModifiedBefore(_)));
            assert_eq!(store.read_count() as u32, budget);
            assert_eq!(store.replace_count() as u32, budget);
        });
    }
}
