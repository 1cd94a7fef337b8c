//! Error types for item operations.
//!
//! Failures that terminate an operation without producing a result value.
//! Store responses whose status appears in the classification table never
//! surface here; they become result variants instead (see [`crate::results`]).

use crate::store::StoreError;

/// Main error type for item operations.
///
/// Covers caller configuration mistakes, store contract violations and
/// unclassified store failures. A value of this type always means the call
/// did not reach a classified outcome.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    /// Safe replace was invoked without an if-match etag precondition
    #[error("Replace of item '{id}' requires an if-match etag precondition")]
    MissingIfMatchEtag { id: String },

    /// Concurrent replace was invoked without an update function
    #[error("No update function configured for concurrent replace of item '{id}'")]
    MissingUpdateFunction { id: String },

    /// Invalid execution configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The store answered successfully but left out data the operation needs
    #[error("Store response for item '{id}' is missing its {missing}")]
    IncompleteResponse { id: String, missing: &'static str },

    /// Store failure outside the classification table
    #[error("Unrecovered store failure: {0}")]
    Store(#[from] StoreError),
}

impl OpsError {
    /// Create a missing if-match error
    pub fn missing_if_match(id: impl Into<String>) -> Self {
        Self::MissingIfMatchEtag { id: id.into() }
    }

    /// Create a missing update function error
    pub fn missing_update_function(id: impl Into<String>) -> Self {
        Self::MissingUpdateFunction { id: id.into() }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an incomplete response error
    pub fn incomplete_response(id: impl Into<String>, missing: &'static str) -> Self {
        Self::IncompleteResponse {
            id: id.into(),
            missing,
        }
    }

    /// Whether this error was caused by the caller's own configuration
    /// rather than by anything the store did.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingIfMatchEtag { .. }
                | Self::MissingUpdateFunction { .. }
                | Self::InvalidConfiguration { .. }
        )
    }

    /// The unclassified store error, if that is what ended the call.
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

pub type OpsResult<T> = Result<T, OpsError>;
