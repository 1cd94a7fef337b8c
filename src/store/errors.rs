//! Errors raised by item stores.
//!
//! A store reports a failed call either as a [`StoreError::Response`], the
//! classified form carrying the status code, raw body and retry hint the
//! service returned, or as one of the unclassified variants for failures that
//! never produced a response (cancellation, transport faults, payloads that
//! could not be (de)serialized).

use std::fmt;
use std::time::Duration;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The store answered with a non-success status.
    Response {
        status: u16,
        body: String,
        retry_after: Option<Duration>,
        request_charge: f64,
    },

    /// The call was aborted because its cancellation signal fired.
    Cancelled,

    /// The store could not be reached or the exchange broke off.
    Transport { message: String },

    /// The item could not be converted to or from its stored form.
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Response {
                status,
                body,
                retry_after,
                ..
            } => {
                if let Some(duration) = retry_after {
                    write!(
                        f,
                        "Store responded with status {}: {} (retry after {:?})",
                        status, body, duration
                    )
                } else {
                    write!(f, "Store responded with status {}: {}", status, body)
                }
            }
            StoreError::Cancelled => write!(f, "Store operation cancelled"),
            StoreError::Transport { message } => write!(f, "Transport error: {}", message),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}

impl StoreError {
    /// Create a new Response error with no retry hint and no charge.
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self::Response {
            status,
            body: body.into(),
            retry_after: None,
            request_charge: 0.0,
        }
    }

    /// Create a new Transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Attach a retry-after hint. No effect on unclassified variants.
    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        if let StoreError::Response { retry_after, .. } = &mut self {
            *retry_after = Some(duration);
        }
        self
    }

    /// Attach the charge the failed call consumed. No effect on unclassified variants.
    pub fn with_request_charge(mut self, charge: f64) -> Self {
        if let StoreError::Response { request_charge, .. } = &mut self {
            *request_charge = charge;
        }
        self
    }

    /// Status code of a response error.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a response error.
    pub fn body(&self) -> Option<&str> {
        match self {
            StoreError::Response { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Charge consumed by the failed call, zero when no response was received.
    pub fn request_charge(&self) -> f64 {
        match self {
            StoreError::Response { request_charge, .. } => *request_charge,
            _ => 0.0,
        }
    }

    /// Check if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}
