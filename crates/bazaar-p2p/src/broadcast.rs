//! Best-effort notice broadcast over the data channel.

use bazaar_types::{Envelope, Notice, PeerKey};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::{Frame, PeerRegistry, Result};

/// Borrowed form of [`Envelope`] for encoding without a clone.
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    message: &'a Notice,
}

/// Fans notices out to every connected peer and decodes inbound ones.
///
/// Delivery is attempted once per session. A session whose writer is gone
/// is skipped with a warning; the remaining sessions still receive the
/// notice.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<PeerRegistry>,
}

impl Broadcaster {
    /// Creates a broadcaster over `registry`.
    pub fn new(registry: Arc<PeerRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry notices are fanned out over.
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Encodes a notice as `{"message": <notice>}`.
    pub fn encode(notice: &Notice) -> Result<Bytes> {
        let json = serde_json::to_vec(&EnvelopeRef { message: notice })?;
        Ok(Bytes::from(json))
    }

    /// Decodes an inbound payload.
    ///
    /// Returns `None` for anything that is not a complete envelope. The
    /// data channel carries partial and foreign payloads, so nothing is
    /// reported beyond a trace line.
    pub fn decode(payload: &[u8]) -> Option<Notice> {
        match serde_json::from_slice::<Envelope>(payload) {
            Ok(envelope) => Some(envelope.message),
            Err(e) => {
                trace!(error = %e, len = payload.len(), "Dropping undecodable payload");
                None
            }
        }
    }

    /// Decodes a payload received from `peer`.
    pub fn receive(&self, peer: &PeerKey, payload: &[u8]) -> Option<Notice> {
        let notice = Self::decode(payload)?;
        debug!(
            peer = %peer.short(),
            auction = notice.auction_name().unwrap_or("?"),
            "Received notice"
        );
        Some(notice)
    }

    /// Sends `notice` to every connected session.
    ///
    /// Returns the number of sessions the notice was queued for.
    pub fn broadcast(&self, notice: &Notice) -> usize {
        let payload = match Self::encode(notice) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode notice");
                return 0;
            }
        };

        let sessions = self.registry.sessions();
        let mut delivered = 0;

        for session in &sessions {
            match session.send(Frame::Data(payload.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    session = %session.id,
                    peer = %session.peer.short(),
                    error = %e,
                    "Failed to send notice"
                ),
            }
        }

        debug!(
            auction = notice.auction_name().unwrap_or("?"),
            sessions = sessions.len(),
            delivered,
            "Notice broadcast"
        );

        delivered
    }
}
