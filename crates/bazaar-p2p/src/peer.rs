//! Peer sessions.

use bazaar_types::PeerKey;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

use crate::{Frame, P2pError, Result};

/// Unique identifier of one connection.
///
/// A peer that connects twice has two sessions.
pub type SessionId = uuid::Uuid;

/// Which side opened the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The remote peer dialed us.
    Inbound,
    /// We dialed the remote peer.
    Outbound,
}

/// An established connection to another peer.
///
/// Cloning a session clones the handle to its writer; the writer shuts
/// down once every clone is dropped.
#[derive(Debug, Clone)]
pub struct PeerSession {
    /// Session identifier.
    pub id: SessionId,
    /// Identity the peer announced in its handshake.
    pub peer: PeerKey,
    /// Remote socket address.
    pub address: SocketAddr,
    /// Which side opened the connection.
    pub direction: Direction,
    /// Unix timestamp when the session was established.
    pub connected_at: u64,
    sender: mpsc::UnboundedSender<Frame>,
}

impl PeerSession {
    /// Creates a session and the receiver its writer drains.
    pub fn new(
        peer: PeerKey,
        address: SocketAddr,
        direction: Direction,
    ) -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connected_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let session = Self {
            id: uuid::Uuid::new_v4(),
            peer,
            address,
            direction,
            connected_at,
            sender,
        };
        (session, receiver)
    }

    /// Queues a frame for this peer.
    pub fn send(&self, frame: Frame) -> Result<()> {
        self.sender.send(frame).map_err(|_| P2pError::ChannelClosed)
    }

    /// Returns true if the writer has shut down.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
