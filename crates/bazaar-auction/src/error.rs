//! Error types for auction operations.

use bazaar_store::StoreError;
use bazaar_types::{Amount, AmountError, PeerKey};
use thiserror::Error;

/// Errors that can occur during auction operations.
#[derive(Debug, Error)]
pub enum AuctionError {
    /// An auction with this name was already opened.
    #[error("auction already exists: {name}")]
    AlreadyExists { name: String },

    /// No auction with this name.
    #[error("auction not found: {name}")]
    NotFound { name: String },

    /// The auction no longer accepts bids.
    #[error("auction is closed: {name}")]
    AuctionClosed { name: String },

    /// The bid does not beat the current highest bid.
    #[error("bid too low on {name}: must be higher than {current}, got {bid}")]
    BidTooLow {
        name: String,
        bid: Amount,
        current: Amount,
    },

    /// Only the seller may close an auction.
    #[error("not authorized to close {name}: {requester} is not the seller")]
    Unauthorized { name: String, requester: PeerKey },

    /// Auction names must not be blank.
    #[error("invalid auction name: {0:?}")]
    InvalidName(String),

    /// The price or bid text is not a usable amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The local replica changed between read and write.
    #[error("auction changed while updating: {name}")]
    Conflict { name: String },

    /// The stored record could not be decoded.
    #[error("invalid record for {name}: {source}")]
    InvalidRecord {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuctionError {
    /// Returns true for failures caused by the request or the current
    /// auction state rather than by storage.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuctionError::AlreadyExists { .. }
                | AuctionError::NotFound { .. }
                | AuctionError::AuctionClosed { .. }
                | AuctionError::BidTooLow { .. }
                | AuctionError::Unauthorized { .. }
                | AuctionError::InvalidName(_)
                | AuctionError::InvalidAmount(_)
        )
    }
}
