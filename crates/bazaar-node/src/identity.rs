//! Node identity.

use bazaar_types::PeerKey;
use ed25519_consensus::SigningKey;
use rand::rngs::OsRng;
use thiserror::Error;

/// Errors loading an identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The secret is not hex.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The secret has the wrong length.
    #[error("expected a 32 byte secret key, got {0} bytes")]
    Length(usize),
}

/// The ed25519 key a node is known by.
///
/// Its public key, hex encoded, is the node's [`PeerKey`]: the seller and
/// buyer identity recorded in auctions.
pub struct NodeIdentity {
    signing_key: SigningKey,
}

impl NodeIdentity {
    /// Generates a new random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::new(OsRng),
        }
    }

    /// Loads an identity from a hex-encoded 32 byte secret.
    pub fn from_secret_hex(secret: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(secret.trim())?;
        let secret: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdentityError::Length(bytes.len()))?;
        Ok(Self {
            signing_key: SigningKey::from(secret),
        })
    }

    /// Returns the peer identity derived from the public key.
    #[must_use]
    pub fn peer_key(&self) -> PeerKey {
        PeerKey::from_public_key(&self.signing_key.verification_key().to_bytes())
    }

    /// Returns the hex-encoded secret key.
    #[must_use]
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIdentity")
            .field("peer_key", &self.peer_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_roundtrip_keeps_identity() {
        let identity = NodeIdentity::generate();
        let restored = NodeIdentity::from_secret_hex(&identity.secret_hex()).unwrap();

        assert_eq!(identity.peer_key(), restored.peer_key());
        assert_eq!(identity.peer_key().as_str().len(), 64);
    }

    #[test]
    fn test_generated_identities_differ() {
        assert_ne!(
            NodeIdentity::generate().peer_key(),
            NodeIdentity::generate().peer_key()
        );
    }

    #[test]
    fn test_rejects_bad_secrets() {
        assert!(matches!(
            NodeIdentity::from_secret_hex("zz"),
            Err(IdentityError::Hex(_))
        ));
        assert!(matches!(
            NodeIdentity::from_secret_hex("abcd"),
            Err(IdentityError::Length(2))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = NodeIdentity::generate();
        let debug = format!("{identity:?}");
        assert!(!debug.contains(&identity.secret_hex()));
    }
}
