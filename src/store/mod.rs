//! Item store abstraction.
//!
//! The store is the external collaborator every operation runs against: a
//! document container addressed by item id and partition key, with
//! conditional writes guarded by etags. The [`ItemStore`] trait captures the
//! three calls the executor needs; everything else about the backend
//! (connections, throughput, queries) stays out of view.
//!
//! # Example Usage
//!
//! ```rust
//! use item_ops::cancellation::CancellationSignal;
//! use item_ops::store::{InMemoryStore, ItemRequestOptions, ItemStore, PartitionKey};
//! use serde_json::{Value, json};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let cancel = CancellationSignal::none();
//! let pk = PartitionKey::from("tenant-a");
//!
//! let created = store
//!     .create_item(&json!({"id": "1", "count": 0}), Some(&pk), &ItemRequestOptions::default(), &cancel)
//!     .await?;
//! assert_eq!(created.status_code, 201);
//!
//! let read = store.read_item::<Value>("1", Some(&pk), &cancel).await?;
//! assert_eq!(read.etag, created.etag);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;


pub use errors::StoreError;
pub use in_memory::{InMemoryStore, InMemoryStoreConfig, InMemoryStoreStats};

use crate::cancellation::CancellationSignal;
use crate::version::ETag;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Status codes the store reports and the executor interprets.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const BAD_REQUEST: u16 = 400;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const CONFLICT: u16 = 409;
    pub const PRECONDITION_FAILED: u16 = 412;
    pub const PAYLOAD_TOO_LARGE: u16 = 413;
    pub const TOO_MANY_REQUESTS: u16 = 429;
}

/// Bound for item payloads.
pub trait Item: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Item for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Logical partition an item lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartitionKey {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl PartitionKey {
    /// Derive a partition key from a JSON value. Arrays and objects are not
    /// valid partition key values.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Null => Some(Self::Null),
            _ => None,
        }
    }

    /// Stable textual form, usable as a map key.
    pub fn to_key_string(&self) -> String {
        match self {
            Self::String(s) => format!("s:{}", s),
            Self::Number(n) => format!("n:{}", n),
            Self::Bool(b) => format!("b:{}", b),
            Self::Null => "null".to_string(),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for PartitionKey {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PartitionKey {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for PartitionKey {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PartitionKey {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for PartitionKey {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Whether a write should be reflected in the container's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexingDirective {
    #[default]
    Default,
    Include,
    Exclude,
}

/// Per-request options passed through to the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemRequestOptions {
    /// Return the written item in the response body.
    pub enable_content_response_on_write: bool,
    /// Only write if the item's current etag equals this one.
    pub if_match_etag: Option<ETag>,
    /// Session token for session consistency.
    pub session_token: Option<String>,
    pub pre_triggers: Vec<String>,
    pub post_triggers: Vec<String>,
    pub indexing_directive: IndexingDirective,
}

impl ItemRequestOptions {
    /// Options with the content-response flag set as given.
    pub fn with_content_response(enabled: bool) -> Self {
        Self {
            enable_content_response_on_write: enabled,
            ..Self::default()
        }
    }

    /// Set the if-match precondition.
    pub fn with_if_match(mut self, etag: impl Into<ETag>) -> Self {
        self.if_match_etag = Some(etag.into());
        self
    }
}

/// Successful store response.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResponse<T> {
    /// The item, absent when a write suppressed content.
    pub resource: Option<T>,
    pub status_code: u16,
    /// Cost units the call consumed.
    pub request_charge: f64,
    /// Current etag of the item after the call.
    pub etag: Option<ETag>,
    /// Store-side correlation id.
    pub activity_id: Option<String>,
}

/// Store capability the executor runs against.
///
/// Implementations must honor the cancellation signal on every call, failing
/// with [`StoreError::Cancelled`] once it has fired, and must report rejected
/// calls as [`StoreError::Response`] with the service's status code.
///
/// # Contract
///
/// - `read_item` returns the item together with its current etag.
/// - `create_item` fails with 409 when the id already exists in the partition.
///   Without an explicit partition key the store derives it from the item.
/// - `replace_item` fails with 404 when the item does not exist and with 412
///   when `options.if_match_etag` is set and differs from the current etag.
pub trait ItemStore: Send + Sync {
    /// Read an item by id.
    fn read_item<T: Item>(
        &self,
        id: &str,
        partition_key: Option<&PartitionKey>,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = Result<ItemResponse<T>, StoreError>> + Send;

    /// Create a new item. The id is taken from the item itself.
    fn create_item<T: Item>(
        &self,
        item: &T,
        partition_key: Option<&PartitionKey>,
        options: &ItemRequestOptions,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = Result<ItemResponse<T>, StoreError>> + Send;

    /// Replace an existing item by id.
    fn replace_item<T: Item>(
        &self,
        item: &T,
        id: &str,
        partition_key: Option<&PartitionKey>,
        options: &ItemRequestOptions,
        cancel: &CancellationSignal,
    ) -> impl Future<Output = Result<ItemResponse<T>, StoreError>> + Send;
}
