//! Auction state machine for Bazaar.
//!
//! [`AuctionHouse`] validates `open`, `bid` and `close` requests against
//! the local replica of the replicated store, writes the updated record,
//! and hands a [`Notice`](bazaar_types::Notice) to its [`Notifier`] so
//! connected peers hear about the change before replication catches up.
//!
//! Every write is conditioned on the version that was read, so two
//! operations racing on the same replica cannot silently overwrite each
//! other. Writers on different replicas are not coordinated; their writes
//! resolve last-writer-wins once replicated.

#![forbid(unsafe_code)]

mod error;
mod house;
mod notifier;
mod transition;

pub use error::AuctionError;
pub use house::AuctionHouse;
pub use notifier::{Notifier, NullNotifier};
pub use transition::{apply_bid, apply_close};

/// Result type for auction operations.
pub type Result<T> = std::result::Result<T, AuctionError>;
