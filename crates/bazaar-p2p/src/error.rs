//! P2P error types.

use thiserror::Error;

/// Errors that can occur during P2P operations.
#[derive(Debug, Error)]
pub enum P2pError {
    /// The handshake did not complete.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The remote peer announced a different topic.
    #[error("topic mismatch: expected {expected:?}, peer announced {found:?}")]
    TopicMismatch {
        /// Our topic.
        expected: String,
        /// Topic the peer announced.
        found: String,
    },

    /// A frame could not be decoded.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The session's writer has shut down.
    #[error("session channel closed")]
    ChannelClosed,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for P2P operations.
pub type Result<T> = std::result::Result<T, P2pError>;
