//! Content hashing for uploaded contract documents.

use core::fmt;

use sha2::{Digest, Sha256};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A lowercase sha256 hex digest of an uploaded document.
///
/// This is the value registered on-chain; equality against a re-computed
/// digest is how callers prove a stored document is the one registered.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct DocumentHash(String);

impl DocumentHash {
    /// Hashes document content into its registry digest.
    pub fn digest(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Returns the digest as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHash {
    /// Formats the digest as its hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DocumentHash {
    /// Wraps a digest string read back from the chain.
    ///
    /// The chain is authoritative for registered hashes, so no re-validation
    /// happens here.
    fn from(hex: String) -> Self {
        Self(hex)
    }
}

impl From<DocumentHash> for String {
    /// Converts a `DocumentHash` into its underlying hex string.
    fn from(DocumentHash(hex): DocumentHash) -> Self {
        hex
    }
}
