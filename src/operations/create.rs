//! Create operation descriptor and builder.

use crate::store::{ItemRequestOptions, PartitionKey};

/// Parameters of a create call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation<T> {
    pub item: T,
    /// Derived from the item by the store when absent.
    pub partition_key: Option<PartitionKey>,
    pub request_options: ItemRequestOptions,
}

/// Fluent builder for [`CreateOperation`].
///
/// # Examples
///
/// ```rust
/// use item_ops::operations::CreateBuilder;
/// use serde_json::json;
///
/// let op = CreateBuilder::returning_content()
///     .item(json!({"id": "1", "tenant": "acme"}))
///     .partition_key("acme")
///     .build();
///
/// assert!(op.request_options.enable_content_response_on_write);
/// ```
#[derive(Debug, Clone)]
pub struct CreateBuilder<T> {
    operation: CreateOperation<T>,
}

impl<T: Default> CreateBuilder<T> {
    /// Builder whose operation does not return the created item.
    pub fn new() -> Self {
        Self::with_content_response(false)
    }

    /// Builder whose operation returns the created item.
    pub fn returning_content() -> Self {
        Self::with_content_response(true)
    }

    fn with_content_response(enabled: bool) -> Self {
        Self {
            operation: CreateOperation {
                item: T::default(),
                partition_key: None,
                request_options: ItemRequestOptions::with_content_response(enabled),
            },
        }
    }
}

impl<T: Default> Default for CreateBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CreateBuilder<T> {
    /// Set the item to create.
    pub fn item(mut self, item: T) -> Self {
        self.operation.item = item;
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

    pub fn build(self) -> CreateOperation<T> {
        self.operation
    }
}
