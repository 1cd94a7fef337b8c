//! Version tags for stored items.
//!
//! An [`ETag`] is the opaque revision token a store hands out with every read
//! and successful write. Passing it back as an if-match precondition makes a
//! write conditional: the store rejects it with `412 Precondition Failed` when
//! the item has been modified since the tag was issued.
//!
//! # Basic Usage
//!
//! ```rust
//! use item_ops::version::ETag;
//!
//! // Store-issued tag, as found in a response header
//! let header_tag: ETag = "\"00000a00-0000-0000-0000-5b3c1ec10000\"".parse().unwrap();
//! assert_eq!(header_tag.as_str(), "00000a00-0000-0000-0000-5b3c1ec10000");
//!
//! // Tag computed from content
//! let content_tag = ETag::from_content(br#"{"id":"1","count":3}"#);
//!
//! // Tags compare by their opaque value only
//! assert_ne!(header_tag, content_tag);
//! assert_eq!(header_tag.to_header(), "\"00000a00-0000-0000-0000-5b3c1ec10000\"");
//! ```

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Opaque version identifier for a stored item.
///
/// The inner value is never interpreted; only equality matters. Tags may be
/// created from store-specific strings (sequence numbers, GUIDs) or derived
/// from content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag {
    opaque: String,
}

impl ETag {
    /// Create a tag from a store-provided value, taken verbatim.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            opaque: value.into(),
        }
    }

    /// Create a tag deterministically from content.
    ///
    /// Hashes the bytes with SHA-256 and keeps the first 8 bytes, base64 encoded.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();

        Self {
            opaque: BASE64.encode(&hash[..8]),
        }
    }

    /// Get the opaque tag value.
    pub fn as_str(&self) -> &str {
        &self.opaque
    }

    /// True when the tag carries no value. An empty tag never satisfies an
    /// if-match precondition.
    pub fn is_empty(&self) -> bool {
        self.opaque.trim().is_empty()
    }

    /// Render as a quoted header value (`"abc"`).
    pub fn to_header(&self) -> String {
        format!("\"{}\"", self.opaque)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opaque)
    }
}

// Accepts raw values as well as quoted or weak (`W/"..."`) header forms
impl FromStr for ETag {
    type Err = VersionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let unprefixed = trimmed.strip_prefix("W/").unwrap_or(trimmed);

        let opaque = if unprefixed.starts_with('"') {
            if unprefixed.len() < 2 || !unprefixed.ends_with('"') {
                return Err(VersionError::InvalidEtagFormat(value.to_string()));
            }
            &unprefixed[1..unprefixed.len() - 1]
        } else {
            unprefixed
        };

        if opaque.is_empty() {
            return Err(VersionError::ParseError(
                "Version tag cannot be empty".to_string(),
            ));
        }

        Ok(Self::new(opaque))
    }
}

impl From<&str> for ETag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ETag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for ETag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.opaque.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ETag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opaque = String::deserialize(deserializer)?;
        Ok(Self { opaque })
    }
}

/// Errors that can occur while parsing version tags.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VersionError {
    /// Quoted tag is malformed
    #[error("Invalid ETag format: {0}")]
    InvalidEtagFormat(String),

    /// Version parsing failed
    #[error("Failed to parse version: {0}")]
    ParseError(String),
}
