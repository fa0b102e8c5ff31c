//! Peer identity.

use serde::{Deserialize, Serialize};

/// Identity of a peer in the auction network.
///
/// Nodes use the hex encoding of their ed25519 public key, but the type
/// itself is opaque: any non-empty string compares by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerKey(String);

impl PeerKey {
    /// Creates a peer key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates a peer key from raw public key bytes.
    #[must_use]
    pub fn from_public_key(bytes: &[u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short prefix suitable for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl std::fmt::Display for PeerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PeerKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
