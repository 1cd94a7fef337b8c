//! Running operation descriptors against a store.
//!
//! [`ItemOperations`] is implemented for every [`ItemStore`], so importing the
//! trait is all it takes to run descriptors against any backend:
//!
//! ```rust
//! use item_ops::cancellation::CancellationSignal;
//! use item_ops::executor::ItemOperations;
//! use item_ops::operations::{ConcurrentReplaceBuilder, CreateBuilder};
//! use item_ops::results::{ConcurrentReplaceResult, CreateResult};
//! use item_ops::store::InMemoryStore;
//! use serde_json::{Value, json};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let cancel = CancellationSignal::none();
//!
//! let create = CreateBuilder::new()
//!     .item(json!({"id": "c1", "count": 0}))
//!     .build();
//! assert!(matches!(store.create(create, &cancel).await?.result, CreateResult::Success(_)));
//!
//! let bump = ConcurrentReplaceBuilder::<Value, String>::returning_content()
//!     .id("c1")
//!     .update(|mut item: Value, _| async move {
//!         let Some(count) = item["count"].as_u64() else {
//!             return Err("count missing".to_string());
//!         };
//!         item["count"] = json!(count + 1);
//!         Ok(item)
//!     })
//!     .build();
//!
//! let response = store.replace_concurrently(bump, &cancel).await?;
//! assert!(matches!(response.result, ConcurrentReplaceResult::Success(_)));
//! # Ok(())
//! # }
//! ```
//!
//! Every entry point returns `Ok` with a classified result for the statuses
//! in the classification table and `Err` for everything else.

mod concurrent;
mod plain;

use crate::cancellation::CancellationSignal;
use crate::config::RetryConfig;
use crate::error::OpsResult;
use crate::operations::{ConcurrentReplaceOperation, CreateOperation, ReplaceOperation};
use crate::results::{ConcurrentReplaceResult, CreateResult, OperationResponse, ReplaceResult};
use crate::store::{Item, ItemStore};
use std::future::Future;

/// Create, replace and concurrent-replace operations over an [`ItemStore`].
///
/// Provided for every store through a blanket implementation.
pub trait ItemOperations: ItemStore {
    /// Create an item.
    ///
    /// # Returns
    /// * `Success(item)` - Stored item, or the submitted one when content is suppressed
    /// * `IdAlreadyExists(body)` - An item with the same id exists in the partition
    /// * other [`CreateResult`] variants per the classification table
    fn create<T: Item>(
        &self,
        operation: CreateOperation<T>,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = OpsResult<OperationResponse<CreateResult<T>>>> + Send
    where
        Self: Sync,
    {
        async move { plain::create(self, operation, cancel).await }
    }

    /// Replace an item under an if-match etag precondition.
    ///
    /// Fails with [`OpsError::MissingIfMatchEtag`](crate::error::OpsError::MissingIfMatchEtag)
    /// before touching the store when the operation carries no etag. A stale
    /// etag yields `ModifiedBefore`.
    fn replace<T: Item>(
        &self,
        operation: ReplaceOperation<T>,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = OpsResult<OperationResponse<ReplaceResult<T>>>> + Send
    where
        Self: Sync,
    {
        async move { plain::replace(self, operation, cancel).await }
    }

    /// Replace an item, with or without a precondition.
    fn overwrite<T: Item>(
        &self,
        operation: ReplaceOperation<T>,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = OpsResult<OperationResponse<ReplaceResult<T>>>> + Send
    where
        Self: Sync,
    {
        async move { plain::overwrite(self, operation, cancel).await }
    }

    /// Read-modify-write with the default retry budget.
    fn replace_concurrently<T, E>(
        &self,
        operation: ConcurrentReplaceOperation<T, E>,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = OpsResult<OperationResponse<ConcurrentReplaceResult<T, E>>>> + Send
    where
        Self: Sync,
        T: Item,
        E: Send + 'static,
    {
        async move {
            let retry = RetryConfig::default();
            concurrent::replace_concurrently(self, operation, &retry, cancel).await
        }
    }

    /// Read-modify-write with an explicit retry budget.
    ///
    /// Reads the item, applies the update function and writes the result
    /// pinned to the etag just read. Only a `412` on that write is retried,
    /// each time from a fresh read, until `retry.max_retry_count` attempts
    /// have been made; the last conflict yields `ModifiedBefore`. A rejection
    /// from the update function ends the call with `CustomError` and nothing
    /// written.
    ///
    /// The envelope's charge is the sum over every store call made.
    fn replace_concurrently_with<T, E>(
        &self,
        operation: ConcurrentReplaceOperation<T, E>,
        retry: &RetryConfig,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = OpsResult<OperationResponse<ConcurrentReplaceResult<T, E>>>> + Send
    where
        Self: Sync,
        T: Item,
        E: Send + 'static,
    {
        async move { concurrent::replace_concurrently(self, operation, retry, cancel).await }
    }
}

impl<S: ItemStore> ItemOperations for S {}
