//! Item operations for partitioned document stores.
//!
//! Builds create, replace and optimistic-concurrency replace calls on top of a
//! minimal document-store interface, and classifies the store's status
//! responses into typed results instead of errors.
//!
//! # Core Components
//!
//! - [`ItemStore`] - Trait for implementing store backends
//! - [`ItemOperations`] - Create, replace, overwrite and concurrent replace over any store
//! - [`operations`] - Operation descriptors and their fluent builders
//! - [`results`] - Classified outcomes and the response envelope
//!
//! # Quick Start
//!
//! ```rust
//! use item_ops::{CancellationSignal, CreateBuilder, InMemoryStore, ItemOperations};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let op = CreateBuilder::returning_content()
//!     .item(json!({"id": "1", "tenant": "acme"}))
//!     .partition_key("acme")
//!     .build();
//!
//! let response = store.create(op, &CancellationSignal::none()).await?;
//! println!("{} ({} RU)", response.status_code, response.request_charge);
//! # Ok(())
//! # }
//! ```

pub mod cancellation;
pub mod config;
pub mod error;
pub mod executor;
pub mod operations;
pub mod results;
pub mod store;
pub mod version;

// Re-export commonly used types for convenience
pub use cancellation::{CancellationSignal, Canceller};
pub use config::RetryConfig;
pub use error::{OpsError, OpsResult};
pub use executor::ItemOperations;
pub use operations::{
    ConcurrentReplaceBuilder, ConcurrentReplaceOperation, CreateBuilder, CreateOperation,
    ReplaceBuilder, ReplaceOperation, UpdateFn,
};
pub use results::{ConcurrentReplaceResult, CreateResult, OperationResponse, ReplaceResult};
pub use store::{
    InMemoryStore, InMemoryStoreConfig, Item, ItemRequestOptions, ItemResponse, ItemStore,
    PartitionKey, StoreError,
};
pub use version::ETag;
