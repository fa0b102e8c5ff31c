//! Common types used throughout `bazaar`.
//!
//! This crate provides the auction record, peer identities, bid amounts
//! and the notices that peers exchange over their data channels.

#![forbid(unsafe_code)]

mod amount;
mod auction;
mod identity;
mod notice;

pub use amount::{Amount, AmountError};
pub use auction::Auction;
pub use identity::PeerKey;
pub use notice::{BidPlaced, Envelope, Notice};

/// Default topic shared by peers of the same auction house.
pub const DEFAULT_TOPIC: &str = "bazaar";
