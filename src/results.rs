//! Result taxonomy for item operations.
//!
//! Each operation kind has a closed set of outcomes. A store failure is
//! translated into one of them by a fixed status table:
//!
//! | Status | [`ReplaceResult`] | [`CreateResult`] |
//! |---|---|---|
//! | 400 | `BadRequest` | `BadRequest` |
//! | 403 | — | `PartitionStorageLimitReached` |
//! | 404 | `NotFound` | — |
//! | 409 | — | `IdAlreadyExists` |
//! | 412 | `ModifiedBefore` | — |
//! | 413 | `EntityTooLarge` | `EntityTooLarge` |
//! | 429 | `TooManyRequests` | `TooManyRequests` |
//!
//! Anything else is handed back unclassified and ends the call as an
//! [`OpsError`](crate::error::OpsError).
//!
//! ```rust
//! use item_ops::results::CreateResult;
//! use item_ops::store::StoreError;
//!
//! let outcome: Result<CreateResult<()>, _> =
//!     CreateResult::classify(StoreError::response(409, "exists"));
//! assert!(matches!(outcome, Ok(CreateResult::IdAlreadyExists(body)) if body == "exists"));
//!
//! let unknown = CreateResult::<()>::classify(StoreError::response(503, "unavailable"));
//! assert!(unknown.is_err());
//! ```

use crate::store::{StoreError, status};
use crate::version::ETag;
use std::time::Duration;

/// Outcome of a create operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateResult<T> {
    /// The item was created
    Success(T),
    /// The item was rejected as malformed (400)
    BadRequest(String),
    /// The target partition is full (403)
    PartitionStorageLimitReached(String),
    /// An item with this id already exists in the partition (409)
    IdAlreadyExists(String),
    /// The item exceeds the size limit (413)
    EntityTooLarge(String),
    /// The store is throttling requests (429)
    TooManyRequests {
        body: String,
        retry_after: Option<Duration>,
    },
}

/// Outcome of a replace or overwrite operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaceResult<T> {
    /// The item was replaced
    Success(T),
    /// The item was rejected as malformed (400)
    BadRequest(String),
    /// No item with this id exists in the partition (404)
    NotFound(String),
    /// The if-match etag no longer matches the stored item (412)
    ModifiedBefore(String),
    /// The item exceeds the size limit (413)
    EntityTooLarge(String),
    /// The store is throttling requests (429)
    TooManyRequests {
        body: String,
        retry_after: Option<Duration>,
    },
}

/// Outcome of a concurrent replace.
///
/// Same store outcomes as [`ReplaceResult`], plus the update function's own
/// rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConcurrentReplaceResult<T, E> {
    Success(T),
    BadRequest(String),
    NotFound(String),
    /// Every permitted attempt lost the race against another writer
    ModifiedBefore(String),
    EntityTooLarge(String),
    TooManyRequests {
        body: String,
        retry_after: Option<Duration>,
    },
    /// The update function rejected the item; nothing was written
    CustomError(E),
}

// Pulls status, body and retry hint out of a response error
fn response_parts(error: &StoreError) -> Option<(u16, String, Option<Duration>)> {
    match error {
        StoreError::Response {
            status,
            body,
            retry_after,
            ..
        } => Some((*status, body.clone(), *retry_after)),
        _ => None,
    }
}

impl<T> CreateResult<T> {
    /// Map a store failure onto the create taxonomy. Statuses outside the
    /// table come back as `Err` unchanged.
    pub fn classify(error: StoreError) -> Result<Self, StoreError> {
        let Some((code, body, retry_after)) = response_parts(&error) else {
            return Err(error);
        };

        match code {
            status::BAD_REQUEST => Ok(Self::BadRequest(body)),
            status::FORBIDDEN => Ok(Self::PartitionStorageLimitReached(body)),
            status::CONFLICT => Ok(Self::IdAlreadyExists(body)),
            status::PAYLOAD_TOO_LARGE => Ok(Self::EntityTooLarge(body)),
            status::TOO_MANY_REQUESTS => Ok(Self::TooManyRequests { body, retry_after }),
            _ => Err(error),
        }
    }

    /// Check if the result represents a successful operation.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Status code the outcome was classified from; `None` for `Success`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success(_) => None,
            Self::BadRequest(_) => Some(status::BAD_REQUEST),
            Self::PartitionStorageLimitReached(_) => Some(status::FORBIDDEN),
            Self::IdAlreadyExists(_) => Some(status::CONFLICT),
            Self::EntityTooLarge(_) => Some(status::PAYLOAD_TOO_LARGE),
            Self::TooManyRequests { .. } => Some(status::TOO_MANY_REQUESTS),
        }
    }

    /// Extract the success value, if present.
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Map the success value to a different type.
    pub fn map<U, F>(self, f: F) -> CreateResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => CreateResult::Success(f(value)),
            Self::BadRequest(body) => CreateResult::BadRequest(body),
            Self::PartitionStorageLimitReached(body) => {
                CreateResult::PartitionStorageLimitReached(body)
            }
            Self::IdAlreadyExists(body) => CreateResult::IdAlreadyExists(body),
            Self::EntityTooLarge(body) => CreateResult::EntityTooLarge(body),
            Self::TooManyRequests { body, retry_after } => {
                CreateResult::TooManyRequests { body, retry_after }
            }
        }
    }
}

impl<T> ReplaceResult<T> {
    /// Map a store failure onto the replace taxonomy. Statuses outside the
    /// table come back as `Err` unchanged.
    pub fn classify(error: StoreError) -> Result<Self, StoreError> {
        let Some((code, body, retry_after)) = response_parts(&error) else {
            return Err(error);
        };

        match code {
            status::BAD_REQUEST => Ok(Self::BadRequest(body)),
            status::NOT_FOUND => Ok(Self::NotFound(body)),
            status::PRECONDITION_FAILED => Ok(Self::ModifiedBefore(body)),
            status::PAYLOAD_TOO_LARGE => Ok(Self::EntityTooLarge(body)),
            status::TOO_MANY_REQUESTS => Ok(Self::TooManyRequests { body, retry_after }),
            _ => Err(error),
        }
    }

    /// Check if the result represents a successful operation.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Check if the result represents a lost optimistic-concurrency race.
    pub fn is_modified_before(&self) -> bool {
        matches!(self, Self::ModifiedBefore(_))
    }

    /// Status code the outcome was classified from; `None` for `Success`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success(_) => None,
            Self::BadRequest(_) => Some(status::BAD_REQUEST),
            Self::NotFound(_) => Some(status::NOT_FOUND),
            Self::ModifiedBefore(_) => Some(status::PRECONDITION_FAILED),
            Self::EntityTooLarge(_) => Some(status::PAYLOAD_TOO_LARGE),
            Self::TooManyRequests { .. } => Some(status::TOO_MANY_REQUESTS),
        }
    }

    /// Extract the success value, if present.
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Map the success value to a different type.
    pub fn map<U, F>(self, f: F) -> ReplaceResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => ReplaceResult::Success(f(value)),
            Self::BadRequest(body) => ReplaceResult::BadRequest(body),
            Self::NotFound(body) => ReplaceResult::NotFound(body),
            Self::ModifiedBefore(body) => ReplaceResult::ModifiedBefore(body),
            Self::EntityTooLarge(body) => ReplaceResult::EntityTooLarge(body),
            Self::TooManyRequests { body, retry_after } => {
                ReplaceResult::TooManyRequests { body, retry_after }
            }
        }
    }
}

impl<T, E> ConcurrentReplaceResult<T, E> {
    /// Map a store failure onto the concurrent replace taxonomy.
    pub fn classify(error: StoreError) -> Result<Self, StoreError> {
        ReplaceResult::<T>::classify(error).map(Self::from)
    }

    /// Check if the result represents a successful operation.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Extract the success value, if present.
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Status code the outcome was classified from; `None` for `Success`
    /// and `CustomError`, which no store status produced.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success(_) | Self::CustomError(_) => None,
            Self::BadRequest(_) => Some(status::BAD_REQUEST),
            Self::NotFound(_) => Some(status::NOT_FOUND),
            Self::ModifiedBefore(_) => Some(status::PRECONDITION_FAILED),
            Self::EntityTooLarge(_) => Some(status::PAYLOAD_TOO_LARGE),
            Self::TooManyRequests { .. } => Some(status::TOO_MANY_REQUESTS),
        }
    }

    /// Extract the update function's error, if that is how the call ended.
    pub fn into_custom_error(self) -> Option<E> {
        match self {
            Self::CustomError(error) => Some(error),
            _ => None,
        }
    }
}

impl<T, E> From<ReplaceResult<T>> for ConcurrentReplaceResult<T, E> {
    fn from(result: ReplaceResult<T>) -> Self {
        match result {
            ReplaceResult::Success(value) => Self::Success(value),
            ReplaceResult::BadRequest(body) => Self::BadRequest(body),
            ReplaceResult::NotFound(body) => Self::NotFound(body),
            ReplaceResult::ModifiedBefore(body) => Self::ModifiedBefore(body),
            ReplaceResult::EntityTooLarge(body) => Self::EntityTooLarge(body),
            ReplaceResult::TooManyRequests { body, retry_after } => {
                Self::TooManyRequests { body, retry_after }
            }
        }
    }
}

/// Response envelope around a classified outcome.
///
/// Carries the store metadata of the call that decided the outcome, or of
/// the failed call for classified failures.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse<R> {
    pub status_code: u16,
    /// Cost units consumed; summed over every store call the operation made.
    pub request_charge: f64,
    /// Etag of the item after a successful write.
    pub etag: Option<ETag>,
    pub activity_id: Option<String>,
    /// Read-transform-write cycles performed; always 1 for single-shot operations.
    pub attempts: u32,
    pub result: R,
}

impl<R> OperationResponse<R> {
    /// Envelope for a classified store failure.
    pub(crate) fn from_failure(error: &StoreError, result: R) -> Self {
        Self {
            status_code: error.status().unwrap_or_default(),
            request_charge: error.request_charge(),
            etag: None,
            activity_id: None,
            attempts: 1,
            result,
        }
    }

    /// Transform the wrapped result, keeping the metadata.
    pub fn map_result<U, F>(self, f: F) -> OperationResponse<U>
    where
        F: FnOnce(R) -> U,
    {
        OperationResponse {
            status_code: self.status_code,
            request_charge: self.request_charge,
            etag: self.etag,
            activity_id: self.activity_id,
            attempts: self.attempts,
            result: f(self.result),
        }
    }
}
