//! # Bazaar P2P
//!
//! Peer-to-peer networking layer for Bazaar.
//!
//! Every connection between two peers carries two independent channels:
//! the log replication protocol and the application data channel used
//! for best-effort auction notices. This crate provides the session
//! registry, both protocols, and a TCP transport that multiplexes them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod broadcast;
mod error;
mod message;
mod peer;
mod registry;
mod replication;
mod transport;

pub use broadcast::Broadcaster;
pub use error::{P2pError, Result};
pub use message::{Frame, FrameKind, Hello, ReplicationMessage};
pub use peer::{Direction, PeerSession, SessionId};
pub use registry::PeerRegistry;
pub use replication::ReplicationProtocol;
pub use transport::{Transport, TransportConfig, TransportEvent};

/// Default port for Bazaar P2P communication.
pub const DEFAULT_PORT: u16 = 9400;

/// Largest frame accepted from a peer.
pub const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;
