//! Concurrent replace descriptor and builder.
//!
//! A concurrent replace carries no item. It names the item to update and an
//! update function that turns the currently stored item into its successor;
//! the executor reads, applies the function and writes back under the etag it
//! read, retrying when another writer got there first.

use crate::cancellation::CancellationSignal;
use crate::store::{ItemRequestOptions, PartitionKey};
use crate::version::ETag;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Shared update function: current item in, successor or rejection out.
pub type UpdateFn<T, E> =
    Arc<dyn Fn(T, CancellationSignal) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Parameters of a concurrent replace call.
pub struct ConcurrentReplaceOperation<T, E> {
    pub id: String,
    pub partition_key: Option<PartitionKey>,
    /// Passed to the write; its if-match etag is always overridden by the one read.
    pub request_options: ItemRequestOptions,
    pub update: Option<UpdateFn<T, E>>,
}

impl<T, E> Clone for ConcurrentReplaceOperation<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            partition_key: self.partition_key.clone(),
            request_options: self.request_options.clone(),
            update: self.update.clone(),
        }
    }
}

impl<T, E> fmt::Debug for ConcurrentReplaceOperation<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentReplaceOperation")
            .field("id", &self.id)
            .field("partition_key", &self.partition_key)
            .field("request_options", &self.request_options)
            .field("update", &self.update.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Fluent builder for [`ConcurrentReplaceOperation`].
///
/// # Examples
///
/// ```rust
/// use item_ops::operations::ConcurrentReplaceBuilder;
/// use serde_json::Value;
///
/// let op = ConcurrentReplaceBuilder::<Value, String>::new()
///     .id("counter-1")
///     .partition_key("acme")
///     .update(|mut item: Value, _cancel| async move {
///         let Some(count) = item["count"].as_u64() else {
///             return Err("count missing".to_string());
///         };
///         item["count"] = (count + 1).into();
///         Ok(item)
///     })
///     .build();
///
/// assert!(op.update.is_some());
/// ```
pub struct ConcurrentReplaceBuilder<T, E> {
    operation: ConcurrentReplaceOperation<T, E>,
}

impl<T, E> ConcurrentReplaceBuilder<T, E> {
    /// Builder whose operation does not return the written item.
    pub fn new() -> Self {
        Self::with_content_response(false)
    }

    /// Builder whose operation returns the written item.
    pub fn returning_content() -> Self {
        Self::with_content_response(true)
    }

    fn with_content_response(enabled: bool) -> Self {
        Self {
            operation: ConcurrentReplaceOperation {
                id: String::new(),
                partition_key: None,
                request_options: ItemRequestOptions::with_content_response(enabled),
                update: None,
            },
        }
    }

    /// Set the id of the item to update.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.operation.id = id.into();
        self
    }

    /// Set the partition key, from a structured key or a raw string.
    pub fn partition_key(mut self, partition_key: impl Into<PartitionKey>) -> Self {
        self.operation.partition_key = Some(partition_key.into());
        self
    }

    /// Replace the request options. The builder's content-response flag is kept.
    pub fn request_options(mut self, options: ItemRequestOptions) -> Self {
        let enabled = self.operation.request_options.enable_content_response_on_write;
        self.operation.request_options = ItemRequestOptions {
            enable_content_response_on_write: enabled,
            ..options
        };
        self
    }

    /// Set an if-match etag. Only informational here: every write is pinned
    /// to the etag of the read that preceded it.
    pub fn if_match_etag(mut self, etag: impl Into<ETag>) -> Self {
        self.operation.request_options.if_match_etag = Some(etag.into());
        self
    }

    /// Set an already shared update function.
    pub fn update_fn(mut self, update: UpdateFn<T, E>) -> Self {
        self.operation.update = Some(update);
        self
    }

    pub fn build(self) -> ConcurrentReplaceOperation<T, E> {
        self.operation
    }
}

impl<T, E> ConcurrentReplaceBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Set the update function.
    ///
    /// It receives the freshly read item and the call's cancellation signal,
    /// and may be invoked once per attempt.
    pub fn update<F, Fut>(self, update: F) -> Self
    where
        F: Fn(T, CancellationSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let shared: UpdateFn<T, E> = Arc::new(
            move |item: T, cancel: CancellationSignal| -> BoxFuture<'static, Result<T, E>> {
                Box::pin(update(item, cancel))
            },
        );
        self.update_fn(shared)
    }
}

impl<T, E> Default for ConcurrentReplaceBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
