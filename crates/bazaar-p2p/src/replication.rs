//! Log replication protocol.

use bazaar_store::{Heads, LogEntry, MemoryLog};
use bazaar_types::PeerKey;
use std::sync::Arc;
use tracing::{debug, info};

use crate::ReplicationMessage;

/// Log replication protocol.
///
/// Each side announces its feed lengths on connect and answers the other
/// side's announcement with the entries it lacks. Local writes are pushed
/// to peers as they happen; a receiver that notices a gap re-announces its
/// heads to pull the missing prefix.
#[derive(Debug, Clone)]
pub struct ReplicationProtocol {
    log: Arc<MemoryLog>,
}

impl ReplicationProtocol {
    /// Create a protocol instance over `log`.
    pub fn new(log: Arc<MemoryLog>) -> Self {
        Self { log }
    }

    /// Returns the replicated log.
    pub fn log(&self) -> &Arc<MemoryLog> {
        &self.log
    }

    /// The message sent when a session opens.
    pub fn handshake(&self) -> ReplicationMessage {
        ReplicationMessage::Heads {
            heads: self.log.heads(),
        }
    }

    /// The message announcing a local append to peers.
    pub fn announce(entry: LogEntry) -> ReplicationMessage {
        ReplicationMessage::Entries {
            entries: vec![entry],
        }
    }

    /// The message re-sending every entry this node holds.
    ///
    /// Used when live pushes may have been missed; receivers drop the
    /// entries they already hold.
    pub fn resync(&self) -> ReplicationMessage {
        ReplicationMessage::Entries {
            entries: self.log.entries_missing_from(&Heads::new()),
        }
    }

    /// Handle an incoming message from a peer.
    ///
    /// Returns an optional reply for the same peer.
    pub fn handle_message(
        &self,
        peer: &PeerKey,
        message: ReplicationMessage,
    ) -> Option<ReplicationMessage> {
        match message {
            ReplicationMessage::Heads { heads } => {
                let missing = self.log.entries_missing_from(&heads);
                if missing.is_empty() {
                    debug!(peer = %peer.short(), "Peer is up to date");
                    return None;
                }

                info!(peer = %peer.short(), entries = missing.len(), "Sending missing entries");
                Some(ReplicationMessage::Entries { entries: missing })
            }
            ReplicationMessage::Entries { entries } => {
                let received = entries.len();
                let outcome = self.log.apply_remote(entries);

                debug!(
                    peer = %peer.short(),
                    received,
                    applied = outcome.applied,
                    "Received entries"
                );

                if outcome.has_gaps() {
                    info!(peer = %peer.short(), gaps = outcome.gaps, "Requesting missing entries");
                    return Some(self.handshake());
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_store::ReplicatedStore;
    use serde_json::json;

    /// Runs a request/reply exchange until neither side has anything to say.
    fn exchange(a: &ReplicationProtocol, b: &ReplicationProtocol) {
        let a_key = PeerKey::from(a.log().writer());
        let b_key = PeerKey::from(b.log().writer());

        let mut to_b = Some(a.handshake());
        let mut to_a = Some(b.handshake());
        while to_a.is_some() || to_b.is_some() {
            let reply_to_a = to_b.take().and_then(|m| b.handle_message(&a_key, m));
            let reply_to_b = to_a.take().and_then(|m| a.handle_message(&b_key, m));
            to_a = reply_to_a;
            to_b = reply_to_b;
        }
    }

    #[tokio::test]
    async fn test_handshake_syncs_both_directions() {
        let alice = ReplicationProtocol::new(Arc::new(MemoryLog::new("alice")));
        let bob = ReplicationProtocol::new(Arc::new(MemoryLog::new("bob")));
        alice.log().put("chair", json!(1)).await.unwrap();
        bob.log().put("lamp", json!(2)).await.unwrap();

        exchange(&alice, &bob);

        for proto in [&alice, &bob] {
            assert_eq!(proto.log().len(), 2);
            assert!(proto.log().get("chair").await.unwrap().is_some());
            assert!(proto.log().get("lamp").await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_up_to_date_peer_gets_no_reply() {
        let alice = ReplicationProtocol::new(Arc::new(MemoryLog::new("alice")));
        let bob = ReplicationProtocol::new(Arc::new(MemoryLog::new("bob")));

        assert!(alice
            .handle_message(&PeerKey::from("bob"), bob.handshake())
            .is_none());
    }

    #[tokio::test]
    async fn test_gap_triggers_heads_request() {
        let alice = ReplicationProtocol::new(Arc::new(MemoryLog::new("alice")));
        let bob = ReplicationProtocol::new(Arc::new(MemoryLog::new("bob")));
        let mut appended = alice.log().subscribe();

        alice.log().put("chair", json!(1)).await.unwrap();
        alice.log().put("chair", json!(2)).await.unwrap();
        let _first = appended.recv().await.unwrap();
        let second = appended.recv().await.unwrap();

        // Bob only sees the live push of the second write.
        let reply = bob.handle_message(&PeerKey::from("alice"), ReplicationProtocol::announce(second));
        let request = match reply {
            Some(request @ ReplicationMessage::Heads { .. }) => request,
            other => panic!("expected heads request, got {other:?}"),
        };

        let fill = alice
            .handle_message(&PeerKey::from("bob"), request)
            .unwrap();
        assert!(bob.handle_message(&PeerKey::from("alice"), fill).is_none());
        assert_eq!(bob.log().get("chair").await.unwrap().unwrap().value, json!(2));
    }

    #[tokio::test]
    async fn test_resync_covers_every_writer() {
        let alice = ReplicationProtocol::new(Arc::new(MemoryLog::new("alice")));
        let bob = ReplicationProtocol::new(Arc::new(MemoryLog::new("bob")));
        let carol = ReplicationProtocol::new(Arc::new(MemoryLog::new("carol")));
        bob.log().put("lamp", json!(2)).await.unwrap();
        exchange(&alice, &bob);
        alice.log().put("chair", json!(1)).await.unwrap();
        alice.log().put("chair", json!(3)).await.unwrap();

        let ReplicationMessage::Entries { entries } = alice.resync() else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 3);

        // Carol never talked to bob but gets his write through alice.
        let relayed = ReplicationMessage::Entries {
            entries: entries.clone(),
        };
        assert!(carol
            .handle_message(&PeerKey::from("alice"), relayed)
            .is_none());
        assert_eq!(carol.log().get("lamp").await.unwrap().unwrap().value, json!(2));
        assert_eq!(carol.log().get("chair").await.unwrap().unwrap().value, json!(3));

        // Bob already holds his own entry and drops it.
        assert!(bob
            .handle_message(&PeerKey::from("alice"), ReplicationMessage::Entries { entries })
            .is_none());
        assert_eq!(bob.log().len(), 3);
    }
}
