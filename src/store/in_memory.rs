//! In-memory item store.
//!
//! A thread-safe [`ItemStore`] backed by nested hash maps behind a tokio
//! `RwLock`, intended for tests, demos and local development. It follows the
//! status semantics of a managed document store closely enough that code
//! written against it behaves the same against a real backend:
//!
//! * every successful write issues a fresh etag, even when the content is unchanged
//! * conditional replaces fail with 412 on etag mismatch
//! * duplicate ids within a partition fail with 409
//! * oversized documents fail with 413, full partitions with 403
//! * documents carry `_etag` (the unquoted tag) and `_ts` system properties
//! * only create derives a missing partition key from the document
//!
//! # Example Usage
//!
//! ```rust
//! use item_ops::cancellation::CancellationSignal;
//! use item_ops::store::{InMemoryStore, InMemoryStoreConfig, ItemRequestOptions, ItemStore};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::with_config(InMemoryStoreConfig {
//!     partition_key_path: Some("/tenant".to_string()),
//!     ..InMemoryStoreConfig::default()
//! });
//!
//! // Partition key derived from the document
//! let doc = json!({"id": "42", "tenant": "acme", "name": "widget"});
//! store
//!     .create_item(&doc, None, &ItemRequestOptions::default(), &CancellationSignal::none())
//!     .await?;
//!
//! assert_eq!(store.stats().await.total_items, 1);
//! # Ok(())
//! # }
//! ```

use crate::cancellation::CancellationSignal;
use crate::store::{
    Item, ItemRequestOptions, ItemResponse, ItemStore, PartitionKey, StoreError, status,
};
use crate::version::ETag;
use log::{debug, trace};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

const READ_CHARGE: f64 = 1.0;
const FAILED_CHARGE: f64 = 1.0;
const WRITE_BASE_CHARGE: f64 = 5.0;

// Partition used when no key is given and none can be derived
const UNPARTITIONED: &str = "none";

/// Limits and layout of an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryStoreConfig {
    /// JSON path (`/a/b`) the partition key is read from when a create call
    /// does not supply one.
    pub partition_key_path: Option<String>,
    /// Largest serialized document accepted, in bytes.
    pub max_item_size_bytes: usize,
    /// Largest number of items a single partition may hold.
    pub max_partition_items: Option<usize>,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self {
            partition_key_path: None,
            max_item_size_bytes: 2 * 1024 * 1024,
            max_partition_items: None,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredItem {
    document: Value,
    etag: ETag,
}

/// Thread-safe in-memory item store.
///
/// Layout: `partition key` → `item id` → `document`. Cloning yields another
/// handle onto the same data.
#[derive(Clone)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<String, HashMap<String, StoredItem>>>>,
    revision: Arc<AtomicU64>,
    config: InMemoryStoreConfig,
}

impl InMemoryStore {
    /// Create an empty store with default limits.
    pub fn new() -> Self {
        Self::with_config(InMemoryStoreConfig::default())
    }

    /// Create an empty store with the given limits.
    pub fn with_config(config: InMemoryStoreConfig) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            revision: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &InMemoryStoreConfig {
        &self.config
    }

    /// Get storage statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryStoreStats {
        let data_guard = self.data.read().await;
        InMemoryStoreStats {
            partition_count: data_guard.values().filter(|p| !p.is_empty()).count(),
            total_items: data_guard.values().map(HashMap::len).sum(),
        }
    }

    /// Number of items in one partition.
    pub async fn item_count(&self, partition_key: Option<&PartitionKey>) -> usize {
        let data_guard = self.data.read().await;
        data_guard
            .get(&Self::partition_slot(partition_key))
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Clear all data (useful for testing).
    pub async fn clear(&self) {
        let mut data_guard = self.data.write().await;
        data_guard.clear();
    }

    fn partition_slot(partition_key: Option<&PartitionKey>) -> String {
        partition_key
            .map(PartitionKey::to_key_string)
            .unwrap_or_else(|| UNPARTITIONED.to_string())
    }

    // Explicit key wins; otherwise read it from the document at the configured path
    fn resolve_partition(&self, explicit: Option<&PartitionKey>, document: &Value) -> String {
        if explicit.is_some() {
            return Self::partition_slot(explicit);
        }

        let Some(path) = &self.config.partition_key_path else {
            return UNPARTITIONED.to_string();
        };

        let derived = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(document, |current, segment| current.get(segment))
            .and_then(PartitionKey::from_json);

        Self::partition_slot(derived.as_ref())
    }

    fn failure(status: u16, body: &str) -> StoreError {
        StoreError::response(status, body).with_request_charge(FAILED_CHARGE)
    }

    // Serializes the item and checks it is an object with an id within size limits
    fn prepare<T: Item>(&self, item: &T) -> Result<(String, Value, usize), StoreError> {
        let document = serde_json::to_value(item)?;
        if !document.is_object() {
            return Err(Self::failure(
                status::BAD_REQUEST,
                "The input content is invalid because it is not a JSON object.",
            ));
        }

        let id = match document.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(Self::failure(
                    status::BAD_REQUEST,
                    "The input content is invalid because the required properties - 'id; ' - are missing.",
                ));
            }
        };

        let size = serde_json::to_vec(&document)?.len();
        if size > self.config.max_item_size_bytes {
            return Err(Self::failure(
                status::PAYLOAD_TOO_LARGE,
                &format!(
                    "Request size is too large: {} bytes exceeds the {} byte limit.",
                    size, self.config.max_item_size_bytes
                ),
            ));
        }

        Ok((id, document, size))
    }

    // Issues the next etag and writes the system properties into the document
    fn stamp(&self, document: &mut Value) -> ETag {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let mut seed = revision.to_be_bytes().to_vec();
        seed.extend_from_slice(document.to_string().as_bytes());
        let etag = ETag::from_content(&seed);

        if let Some(object) = document.as_object_mut() {
            object.insert("_etag".to_string(), Value::String(etag.as_str().to_string()));
            object.insert("_ts".to_string(), Value::from(chrono::Utc::now().timestamp()));
        }

        etag
    }

    fn write_charge(size: usize) -> f64 {
        WRITE_BASE_CHARGE + size.div_ceil(1024) as f64
    }

    fn respond<T: Item>(
        document: &Value,
        etag: &ETag,
        status_code: u16,
        request_charge: f64,
        include_content: bool,
    ) -> Result<ItemResponse<T>, StoreError> {
        let resource = if include_content {
            Some(serde_json::from_value(document.clone())?)
        } else {
            None
        };

        Ok(ItemResponse {
            resource,
            status_code,
            request_charge,
            etag: Some(etag.clone()),
            activity_id: Some(uuid::Uuid::new_v4().to_string()),
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the contents of an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStoreStats {
    /// Partitions holding at least one item
    pub partition_count: usize,
    pub total_items: usize,
}

impl ItemStore for InMemoryStore {
    async fn read_item<T: Item>(
        &self,
        id: &str,
        partition_key: Option<&PartitionKey>,
        cancel: &CancellationSignal,
    ) -> Result<ItemResponse<T>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let slot = Self::partition_slot(partition_key);
        trace!("Reading item '{}' from partition '{}'", id, slot);

        let data_guard = self.data.read().await;
        let stored = data_guard
            .get(&slot)
            .and_then(|partition| partition.get(id))
            .ok_or_else(|| {
                Self::failure(
                    status::NOT_FOUND,
                    "Entity with the specified id does not exist in the system.",
                )
            })?;

        Self::respond(&stored.document, &stored.etag, status::OK, READ_CHARGE, true)
    }

    async fn create_item<T: Item>(
        &self,
        item: &T,
        partition_key: Option<&PartitionKey>,
        options: &ItemRequestOptions,
        cancel: &CancellationSignal,
    ) -> Result<ItemResponse<T>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let (id, mut document, size) = self.prepare(item)?;
        let slot = self.resolve_partition(partition_key, &document);

        let mut data_guard = self.data.write().await;
        let partition = data_guard.entry(slot.clone()).or_default();

        if partition.contains_key(&id) {
            return Err(Self::failure(
                status::CONFLICT,
                "Entity with the specified id already exists in the system.",
            ));
        }
        if let Some(limit) = self.config.max_partition_items {
            if partition.len() >= limit {
                return Err(Self::failure(
                    status::FORBIDDEN,
                    "The size of the partition has reached its maximum.",
                ));
            }
        }

        let etag = self.stamp(&mut document);
        let response = Self::respond(
            &document,
            &etag,
            status::CREATED,
            Self::write_charge(size),
            options.enable_content_response_on_write,
        )?;
        partition.insert(id.clone(), StoredItem { document, etag });

        debug!("Created item '{}' in partition '{}'", id, slot);
        Ok(response)
    }

    async fn replace_item<T: Item>(
        &self,
        item: &T,
        id: &str,
        partition_key: Option<&PartitionKey>,
        options: &ItemRequestOptions,
        cancel: &CancellationSignal,
    ) -> Result<ItemResponse<T>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let (body_id, mut document, size) = self.prepare(item)?;
        if body_id != id {
            return Err(Self::failure(
                status::BAD_REQUEST,
                "The id in the request body does not match the id in the request.",
            ));
        }
        // Only create derives the key from the document
        let slot = Self::partition_slot(partition_key);

        let mut data_guard = self.data.write().await;
        let stored = data_guard
            .get_mut(&slot)
            .and_then(|partition| partition.get_mut(id))
            .ok_or_else(|| {
                Self::failure(
                    status::NOT_FOUND,
                    "Entity with the specified id does not exist in the system.",
                )
            })?;

        if let Some(expected) = &options.if_match_etag {
            if *expected != stored.etag {
                debug!(
                    "Rejected replace of '{}': expected etag {}, current {}",
                    id, expected, stored.etag
                );
                return Err(Self::failure(
                    status::PRECONDITION_FAILED,
                    "Operation cannot be performed because one of the specified precondition is not met.",
                ));
            }
        }

        let etag = self.stamp(&mut document);
        let response = Self::respond(
            &document,
            &etag,
            status::OK,
            Self::write_charge(size),
            options.enable_content_response_on_write,
        )?;
        *stored = StoredItem { document, etag };

        debug!("Replaced item '{}' in partition '{}'", id, slot);
        Ok(response)
    }
}
