//! Replace operation descriptor and builder.
//!
//! One descriptor serves both replace entry points: the safe path refuses to
//! run without an if-match etag, the overwrite path ignores its absence.

use crate::store::{ItemRequestOptions, PartitionKey};
use crate::version::ETag;

/// Parameters of a replace call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOperation<T> {
    pub item: T,
    pub id: String,
    pub partition_key: Option<PartitionKey>,
    pub request_options: ItemRequestOptions,
}

impl<T> ReplaceOperation<T> {
    /// The if-match precondition, if one is set and non-empty.
    pub fn if_match_etag(&self) -> Option<&ETag> {
        self.request_options
            .if_match_etag
            .as_ref()
            .filter(|etag| !etag.is_empty())
    }
}

/// Fluent builder for [`ReplaceOperation`].
///
/// # Examples
///
/// ```rust
/// use item_ops::operations::ReplaceBuilder;
/// use serde_json::json;
///
/// let op = ReplaceBuilder::new()
///     .item(json!({"id": "1", "count": 2}))
///     .id("1")
///     .partition_key("acme")
///     .if_match_etag("\"v1\"".parse::<item_ops::version::ETag>().unwrap())
///     .build();
///
/// assert_eq!(op.if_match_etag().map(|e| e.as_str()), Some("v1"));
/// assert!(!op.request_options.enable_content_response_on_write);
/// ```
#[derive(Debug, Clone)]
pub struct ReplaceBuilder<T> {
    operation: ReplaceOperation<T>,
}

impl<T: Default> ReplaceBuilder<T> {
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
            operation: ReplaceOperation {
                item: T::default(),
                id: String::new(),
                partition_key: None,
                request_options: ItemRequestOptions::with_content_response(enabled),
            },
        }
    }
}

impl<T: Default> Default for ReplaceBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReplaceBuilder<T> {
    /// Set the replacement item.
    pub fn item(mut self, item: T) -> Self {
        self.operation.item = item;
        self
    }

    /// Set the id of the item to replace.
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

    /// Require the stored item to still carry this etag.
    pub fn if_match_etag(mut self, etag: impl Into<ETag>) -> Self {
        self.operation.request_options.if_match_etag = Some(etag.into());
        self
    }

    pub fn build(self) -> ReplaceOperation<T> {
        self.operation
    }
}
