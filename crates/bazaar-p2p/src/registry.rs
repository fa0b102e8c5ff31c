//! Registry of live peer sessions.

use bazaar_types::PeerKey;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

use crate::{PeerSession, SessionId};

/// The set of currently connected peer sessions.
///
/// Used as the fan-out list for broadcasts. There is no ordering among
/// sessions.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    sessions: RwLock<HashMap<SessionId, PeerSession>>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session and returns the new session count.
    pub fn insert(&self, session: PeerSession) -> usize {
        let mut sessions = self.sessions.write();
        info!(
            session = %session.id,
            peer = %session.peer.short(),
            address = %session.address,
            "Peer connected"
        );
        sessions.insert(session.id, session);
        sessions.len()
    }

    /// Removes a session.
    pub fn remove(&self, id: &SessionId) -> Option<PeerSession> {
        let removed = self.sessions.write().remove(id);
        if let Some(session) = &removed {
            info!(session = %id, peer = %session.peer.short(), "Peer disconnected");
        }
        removed
    }

    /// Gets a session by ID.
    pub fn get(&self, id: &SessionId) -> Option<PeerSession> {
        self.sessions.read().get(id).cloned()
    }

    /// Returns true if the session is registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if no peer is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Returns a snapshot of all sessions.
    ///
    /// Callers send on the snapshot so no lock is held during fan-out.
    pub fn sessions(&self) -> Vec<PeerSession> {
        self.sessions.read().values().cloned().collect()
    }

    /// Returns the distinct identities of connected peers.
    pub fn peers(&self) -> Vec<PeerKey> {
        let mut peers: Vec<PeerKey> = self
            .sessions
            .read()
            .values()
            .map(|s| s.peer.clone())
            .collect();
        peers.sort();
        peers.dedup();
        peers
    }
}
