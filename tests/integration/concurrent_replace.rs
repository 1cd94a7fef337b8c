//! Concurrent replace loop against a scripted store.
//!
//! The scripted store fixes every read and write answer up front, which makes
//! the retry path deterministic: a `412` on the write is another writer having
//! got in between.

use crate::common::*;
use crate::{assert_ops_error, assert_variant};
use item_ops::config::RetryConfig;
use item_ops::error::OpsError;
use item_ops::executor::ItemOperations;
use item_ops::operations::{ConcurrentReplaceBuilder, ConcurrentReplaceOperation};
use item_ops::results::ConcurrentReplaceResult;
use item_ops::store::{ItemRequestOptions, StoreError, status};
use item_ops::version::ETag;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn increment(id: &str) -> ConcurrentReplaceOperation<Counter, String> {
    ConcurrentReplaceBuilder::new()
        .id(id)
        .partition_key("acme")
        .update(|mut c: Counter, _| async move {
            c.count += 1;
            Ok(c)
        })
        .build()
}

fn budget(max_retry_count: u32) -> RetryConfig {
    RetryConfig::new().with_max_retry_count(max_retry_count)
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 4, "v1"))
        .on_replace(written(status::OK, "v2"));

    let response = store
        .replace_concurrently(increment("c1"), &no_cancel())
        .await
        .unwrap();

    assert_eq!(response.attempts, 1);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.etag, Some(ETag::new("v2")));
    // Read (1.0) plus write (5.0)
    assert_eq!(response.request_charge, 6.0);
    assert_eq!(response.result, ConcurrentReplaceResult::Success(counter("c1", 5)));
    assert_eq!(store.replace_options()[0].if_match_etag, Some(ETag::new("v1")));
}

#[tokio::test]
async fn test_conflict_then_success_consumes_one_retry() {
    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(precondition_failed())
        .on_read(read_ok("c1", 2, "v2"))
        .on_replace(written(status::OK, "v3"));

    let response = store
        .replace_concurrently_with(increment("c1"), &budget(3), &no_cancel())
        .await
        .unwrap();

    assert_eq!(response.attempts, 2);
    assert_eq!(store.read_count(), 2);
    assert_eq!(store.replace_count(), 2);
    // 1.0 + 1.0 (failed write) + 1.0 + 5.0
    assert_eq!(response.request_charge, 8.0);

    // Second write is pinned to the second read and built from its payload
    let pinned: Vec<_> = store
        .replace_options()
        .into_iter()
        .map(|o| o.if_match_etag)
        .collect();
    assert_eq!(pinned, vec![Some(ETag::new("v1")), Some(ETag::new("v2"))]);
    assert_eq!(
        store.replaced_items(),
        vec![counter_json("c1", 2), counter_json("c1", 3)]
    );
    assert_eq!(response.result, ConcurrentReplaceResult::Success(counter("c1", 3)));
}

#[tokio::test]
async fn test_single_attempt_budget_gives_up_on_first_conflict() {
    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(precondition_failed());

    let response = store
        .replace_concurrently_with(increment("c1"), &budget(1), &no_cancel())
        .await
        .unwrap();

    assert_variant!(response.result, ConcurrentReplaceResult::ModifiedBefore(_));
    assert_eq!(response.status_code, 412);
    assert_eq!(response.attempts, 1);
    assert_eq!(store.read_count(), 1);
    assert_eq!(store.replace_count(), 1);
}

#[tokio::test]
async fn test_budget_bounds_total_attempts() {
    let mut store = ScriptedStore::new();
    for n in 0..3 {
        store = store
            .on_read(read_ok("c1", n, &format!("v{}", n)))
            .on_replace(precondition_failed());
    }

    let response = store
        .replace_concurrently_with(increment("c1"), &budget(3), &no_cancel())
        .await
        .unwrap();

    assert_eq!(
        response.result,
        ConcurrentReplaceResult::ModifiedBefore("etag mismatch".to_string())
    );
    assert_eq!(response.attempts, 3);
    assert_eq!(store.read_count(), 3);
    assert_eq!(store.replace_count(), 3);
    assert_eq!(response.request_charge, 6.0);
}

#[tokio::test]
async fn test_update_function_sees_fresh_item() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observed = Arc::clone(&seen);
    let op = ConcurrentReplaceBuilder::<Counter, String>::new()
        .id("c1")
        .update(move |mut c: Counter, _| {
            let observed = Arc::clone(&observed);
            async move {
                observed.lock().unwrap().push(c.count);
                c.count *= 10;
                Ok(c)
            }
        })
        .build();

    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(precondition_failed())
        .on_read(read_ok("c1", 7, "v2"))
        .on_replace(written(status::OK, "v3"));

    let response = store
        .replace_concurrently_with(op, &budget(5), &no_cancel())
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1, 7]);
    assert_eq!(response.result.into_success(), Some(counter("c1", 70)));
}

#[tokio::test]
async fn test_rejection_writes_nothing() {
    let op = ConcurrentReplaceBuilder::<Counter, String>::new()
        .id("c1")
        .update(|c: Counter, _| async move {
            if c.count >= 10 {
                Err(format!("counter {} is at its limit", c.id))
            } else {
                Ok(c)
            }
        })
        .build();

    let store = ScriptedStore::new().on_read(read_ok("c1", 10, "v1"));

    let response = store.replace_concurrently(op, &no_cancel()).await.unwrap();

    assert_eq!(store.replace_count(), 0);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.etag, Some(ETag::new("v1")));
    assert_eq!(response.request_charge, 1.0);
    assert_eq!(
        response.result,
        ConcurrentReplaceResult::CustomError("counter c1 is at its limit".to_string())
    );
}

#[tokio::test]
async fn test_rejection_after_conflict() {
    let op = ConcurrentReplaceBuilder::<Counter, &'static str>::new()
        .id("c1")
        .update(|c: Counter, _| async move {
            if c.count > 1 { Err("too late") } else { Ok(c) }
        })
        .build();

    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(precondition_failed())
        .on_read(read_ok("c1", 2, "v2"));

    let response = store
        .replace_concurrently_with(op, &budget(3), &no_cancel())
        .await
        .unwrap();

    assert_eq!(response.attempts, 2);
    assert_eq!(store.replace_count(), 1);
    assert_eq!(response.result.into_custom_error(), Some("too late"));
}

#[tokio::test]
async fn test_missing_item_on_read() {
    let store = ScriptedStore::new().on_read(failed(status::NOT_FOUND, "no such item"));

    let response = store
        .replace_concurrently(increment("c1"), &no_cancel())
        .await
        .unwrap();

    assert_eq!(
        response.result,
        ConcurrentReplaceResult::NotFound("no such item".to_string())
    );
    assert_eq!(store.replace_count(), 0);
}

#[tokio::test]
async fn test_throttled_write_is_not_retried() {
    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(Err(StoreError::response(status::TOO_MANY_REQUESTS, "busy")
            .with_retry_after(Duration::from_secs(1))));

    let response = store
        .replace_concurrently_with(increment("c1"), &budget(10), &no_cancel())
        .await
        .unwrap();

    assert_eq!(
        response.result,
        ConcurrentReplaceResult::TooManyRequests {
            body: "busy".to_string(),
            retry_after: Some(Duration::from_secs(1)),
        }
    );
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn test_unclassified_write_failure_is_error() {
    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(failed(500, "internal"));

    let result = store
        .replace_concurrently(increment("c1"), &no_cancel())
        .await;

    assert_ops_error!(result, OpsError::Store(StoreError::Response { status: 500, .. }));
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn test_read_without_etag_is_incomplete() {
    let store = ScriptedStore::new().on_read(Ok(Scripted::new(
        status::OK,
        Some(counter_json("c1", 1)),
        None,
    )));

    let result = store
        .replace_concurrently(increment("c1"), &no_cancel())
        .await;

    assert_ops_error!(result, OpsError::IncompleteResponse { missing: "etag", .. });
    assert_eq!(store.replace_count(), 0);
}

#[tokio::test]
async fn test_read_without_payload_is_incomplete() {
    let store = ScriptedStore::new().on_read(Ok(Scripted::new(status::OK, None, Some("v1"))));

    let result = store
        .replace_concurrently(increment("c1"), &no_cancel())
        .await;

    assert_ops_error!(result, OpsError::IncompleteResponse { missing: "item", .. });
}

#[tokio::test]
async fn test_missing_update_function_fails_before_read() {
    let store = ScriptedStore::new();
    let op = ConcurrentReplaceBuilder::<Counter, String>::new()
        .id("c1")
        .build();

    let result = store.replace_concurrently(op, &no_cancel()).await;

    assert_ops_error!(result, OpsError::MissingUpdateFunction { .. });
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_zero_budget_is_rejected() {
    let store = ScriptedStore::new();

    let result = store
        .replace_concurrently_with(increment("c1"), &budget(0), &no_cancel())
        .await;

    assert_ops_error!(result, OpsError::InvalidConfiguration { .. });
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_read_etag_overrides_supplied_if_match() {
    let op = ConcurrentReplaceBuilder::<Counter, String>::returning_content()
        .id("c1")
        .request_options(ItemRequestOptions {
            session_token: Some("s-1".to_string()),
            ..ItemRequestOptions::default()
        })
        .if_match_etag("caller-etag")
        .update(|c: Counter, _| async move { Ok(c) })
        .build();

    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(written_with(status::OK, "c1", 1, "v2"));

    store.replace_concurrently(op, &no_cancel()).await.unwrap();

    let sent = &store.replace_options()[0];
    assert_eq!(sent.if_match_etag, Some(ETag::new("v1")));
    assert_eq!(sent.session_token.as_deref(), Some("s-1"));
    assert!(sent.enable_content_response_on_write);
}

#[tokio::test]
async fn test_reads_use_operation_partition_key() {
    let store = ScriptedStore::new()
        .on_read(read_ok("c1", 1, "v1"))
        .on_replace(written(status::OK, "v2"));

    store
        .replace_concurrently(increment("c1"), &no_cancel())
        .await
        .unwrap();

    assert_eq!(
        store.calls()[0],
        Call::Read {
            id: "c1".to_string(),
            partition_key: Some("acme".into()),
        }
    );
}
