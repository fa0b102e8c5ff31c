//! Replicated storage for Bazaar.
//!
//! Auctions live in a key-value view projected over an append-only log
//! that every peer replicates. This crate provides:
//!
//! - [`ReplicatedStore`]: the key-value interface the auction logic uses
//! - [`MemoryLog`]: an in-memory multi-writer log implementing it
//! - [`LogEntry`], [`Version`] and [`Heads`]: the units peers exchange
//!   when they replicate
//!
//! ## Consistency
//!
//! Each writer appends to its own feed. The value of a key is the entry
//! with the greatest [`Version`] (Lamport clock, then writer), so any two
//! replicas holding the same entries agree on every key. A replica that
//! has not yet received a remote entry keeps serving the older value.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod log;
mod memory;
mod traits;

pub use error::{Result, StoreError};
pub use log::{ApplyOutcome, Heads, LogEntry, Version, Versioned};
pub use memory::MemoryLog;
pub use traits::ReplicatedStore;

/// Capacity of the local append notification channel.
pub const APPEND_CHANNEL_CAPACITY: usize = 256;
