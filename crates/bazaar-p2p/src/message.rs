//! Wire frames multiplexed over a peer connection.

use bazaar_store::{Heads, LogEntry};
use bazaar_types::PeerKey;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::{P2pError, Result};

/// Frame type discriminator, the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    /// Handshake greeting.
    Hello = 1,
    /// Log replication protocol.
    Replication = 2,
    /// Application data channel.
    Data = 3,
}

impl FrameKind {
    /// Parse a frame kind from a byte.
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            1 => Ok(FrameKind::Hello),
            2 => Ok(FrameKind::Replication),
            3 => Ok(FrameKind::Data),
            _ => Err(P2pError::InvalidFrame(format!("unknown frame kind: {b}"))),
        }
    }
}

/// Handshake greeting, the first frame each side sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Identity of the sending peer.
    pub peer: PeerKey,
    /// Topic the sender joined.
    pub topic: String,
}

/// Log replication messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplicationMessage {
    /// Feed lengths of the sender; the receiver answers with what is missing.
    Heads {
        /// Length of every feed the sender holds.
        heads: Heads,
    },
    /// Log entries, in feed order.
    Entries {
        /// The entries.
        entries: Vec<LogEntry>,
    },
}

/// A single frame on a peer connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Handshake greeting.
    Hello(Hello),
    /// Replication message.
    Replication(ReplicationMessage),
    /// Opaque application payload.
    Data(Bytes),
}

impl Frame {
    /// Returns the kind of this frame.
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Hello(_) => FrameKind::Hello,
            Frame::Replication(_) => FrameKind::Replication,
            Frame::Data(_) => FrameKind::Data,
        }
    }

    /// Encode the frame to bytes.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        buf.put_u8(self.kind() as u8);

        match self {
            Frame::Hello(hello) => serde_json::to_writer((&mut buf).writer(), hello)?,
            Frame::Replication(message) => serde_json::to_writer((&mut buf).writer(), message)?,
            Frame::Data(payload) => buf.put_slice(payload),
        }

        Ok(buf.freeze())
    }

    /// Decode a frame from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (&kind, payload) = data
            .split_first()
            .ok_or_else(|| P2pError::InvalidFrame("empty frame".into()))?;

        match FrameKind::from_byte(kind)? {
            FrameKind::Hello => Ok(Frame::Hello(serde_json::from_slice(payload)?)),
            FrameKind::Replication => Ok(Frame::Replication(serde_json::from_slice(payload)?)),
            FrameKind::Data => Ok(Frame::Data(Bytes::copy_from_slice(payload))),
        }
    }
}
