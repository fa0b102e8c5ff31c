//! # Bazaar Node
//!
//! A peer-to-peer auction node.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  InteractionLoop (console menu)              │
//! │            │                                 │
//! │  AuctionHouse (open / bid / close)           │
//! │      │                        │              │
//! │  MemoryLog (replicated)   Broadcaster        │
//! │      │                        │              │
//! │  ReplicationProtocol      PeerRegistry       │
//! │      └──────── Transport ─────┘              │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Auction state converges through log replication. Broadcast notices
//! are a faster, unordered heads-up for peers that are directly
//! connected.
//!
//! ## Modules
//!
//! - [`config`] - Node configuration (YAML file, environment, CLI)
//! - [`identity`] - ed25519 node identity
//! - [`console`] - Console I/O used by the interaction loop
//! - [`interaction`] - The open / bid / close menu loop
//! - [`node`] - Wiring of store, transport, replication and broadcast
//! - [`observability`] - Structured logging

pub mod config;
pub mod console;
pub mod identity;
pub mod interaction;
pub mod node;
pub mod observability;

pub use config::{ConfigError, NodeConfig};
pub use console::{Console, StdConsole};
pub use identity::{IdentityError, NodeIdentity};
pub use interaction::{InteractionLoop, MenuChoice, MENU};
pub use node::{BroadcastNotifier, Node, NodeHouse, ReceivedNotice};
