//! Node wiring.
//!
//! A [`Node`] owns the replicated log, the transport and the peer registry.
//! A single event task consumes [`TransportEvent`]s: it is the only place
//! sessions enter or leave the registry, it answers replication messages
//! on the session they arrived on, and it decodes data frames into
//! [`ReceivedNotice`]s. A second task pushes every entry that enters the
//! log, local or replicated, to every session, so writes reach peers that
//! are only connected through other peers.

use bazaar_auction::{AuctionHouse, Notifier};
use bazaar_p2p::{
    Broadcaster, Frame, P2pError, PeerRegistry, ReplicationProtocol, Transport, TransportConfig,
    TransportEvent,
};
use bazaar_store::{LogEntry, MemoryLog};
use bazaar_types::{Notice, PeerKey};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{NodeConfig, NodeIdentity};

/// Capacity of the received-notice channel.
pub const NOTICE_CHANNEL_CAPACITY: usize = 256;

/// The auction house a node runs.
pub type NodeHouse = AuctionHouse<Arc<MemoryLog>, BroadcastNotifier>;

/// Notifies connected peers through a [`Broadcaster`].
#[derive(Debug, Clone)]
pub struct BroadcastNotifier(Broadcaster);

impl BroadcastNotifier {
    /// Wraps `broadcaster`.
    pub fn new(broadcaster: Broadcaster) -> Self {
        Self(broadcaster)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notice: Notice) {
        self.0.broadcast(&notice);
    }
}

/// A notice received from a peer.
#[derive(Debug, Clone)]
pub struct ReceivedNotice {
    /// Peer that sent it.
    pub from: PeerKey,
    /// The decoded notice.
    pub notice: Notice,
}

/// A running auction node.
pub struct Node {
    identity: NodeIdentity,
    peer_key: PeerKey,
    listen_addr: SocketAddr,
    log: Arc<MemoryLog>,
    registry: Arc<PeerRegistry>,
    transport: Transport,
    house: Arc<NodeHouse>,
    notices: broadcast::Sender<ReceivedNotice>,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Starts listening and spawns the node's background tasks.
    ///
    /// Bootstrap peers are not dialed here; see [`Node::connect`].
    pub async fn start(config: &NodeConfig, identity: NodeIdentity) -> Result<Self, P2pError> {
        let peer_key = identity.peer_key();
        let log = Arc::new(MemoryLog::new(writer_id(&peer_key)));
        let registry = Arc::new(PeerRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let replication = ReplicationProtocol::new(Arc::clone(&log));

        let (transport, events) = Transport::new(TransportConfig {
            local: peer_key.clone(),
            topic: config.topic.clone(),
        });
        let listen_addr = transport.listen(config.listen_addr).await?;

        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        let appended = log.subscribe();

        let tasks = vec![
            tokio::spawn(run_events(
                events,
                Arc::clone(&registry),
                broadcaster.clone(),
                replication.clone(),
                notices.clone(),
            )),
            tokio::spawn(push_entries(appended, Arc::clone(&registry), replication)),
        ];

        let house = Arc::new(AuctionHouse::new(
            Arc::clone(&log),
            BroadcastNotifier::new(broadcaster),
        ));

        info!(
            peer = %peer_key.short(),
            addr = %listen_addr,
            topic = %config.topic,
            "Node started"
        );

        Ok(Self {
            identity,
            peer_key,
            listen_addr,
            log,
            registry,
            transport,
            house,
            notices,
            tasks,
        })
    }

    /// Dials a peer and returns its identity once the handshake completes.
    pub async fn connect(&self, addr: SocketAddr) -> Result<PeerKey, P2pError> {
        let peer = self.transport.dial(addr).await?;
        info!(peer = %peer.short(), addr = %addr, "Connected to peer");
        Ok(peer)
    }

    /// Returns the auction house.
    pub fn house(&self) -> Arc<NodeHouse> {
        Arc::clone(&self.house)
    }

    /// Returns this node's identity.
    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Returns this node's peer key.
    pub fn peer_key(&self) -> &PeerKey {
        &self.peer_key
    }

    /// Returns the address the node is listening on.
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Returns the connected sessions.
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Returns the replicated log.
    pub fn log(&self) -> &Arc<MemoryLog> {
        &self.log
    }

    /// Subscribes to notices received from peers.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<ReceivedNotice> {
        self.notices.subscribe()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("peer_key", &self.peer_key)
            .field("listen_addr", &self.listen_addr)
            .field("sessions", &self.registry.len())
            .finish_non_exhaustive()
    }
}

async fn run_events(
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    registry: Arc<PeerRegistry>,
    broadcaster: Broadcaster,
    replication: ReplicationProtocol,
    notices: broadcast::Sender<ReceivedNotice>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Connected(session) => {
                if let Err(e) = session.send(Frame::Replication(replication.handshake())) {
                    warn!(session = %session.id, error = %e, "Failed to start replication");
                }
                registry.insert(session);
            }
            TransportEvent::Frame {
                session,
                peer,
                frame,
            } => match frame {
                Frame::Replication(message) => {
                    let Some(reply) = replication.handle_message(&peer, message) else {
                        continue;
                    };
                    let sent = registry
                        .get(&session)
                        .map(|s| s.send(Frame::Replication(reply)));
                    if let Some(Err(e)) = sent {
                        warn!(session = %session, error = %e, "Failed to send replication reply");
                    }
                }
                Frame::Data(payload) => {
                    if let Some(notice) = broadcaster.receive(&peer, &payload) {
                        // No subscribers is fine.
                        let _ = notices.send(ReceivedNotice { from: peer, notice });
                    }
                }
                Frame::Hello(_) => {
                    debug!(session = %session, "Ignoring repeated hello");
                }
            },
            TransportEvent::Disconnected { session, .. } => {
                registry.remove(&session);
            }
        }
    }

    debug!("Transport closed, stopping event loop");
}

/// Log writer identity for one run of a node.
///
/// The log is not persisted, so a restarted node starts a fresh feed. The
/// suffix keeps it from reusing sequence numbers peers already hold for
/// the previous run.
fn writer_id(peer_key: &PeerKey) -> String {
    format!("{peer_key}:{}", Uuid::new_v4().simple())
}

async fn push_entries(
    mut appended: broadcast::Receiver<LogEntry>,
    registry: Arc<PeerRegistry>,
    replication: ReplicationProtocol,
) {
    loop {
        let message = match appended.recv().await {
            Ok(entry) => ReplicationProtocol::announce(entry),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed log entries, resending the whole log");
                replication.resync()
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        for session in registry.sessions() {
            if let Err(e) = session.send(Frame::Replication(message.clone())) {
                debug!(session = %session.id, error = %e, "Failed to push entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_id_is_fresh_per_run() {
        let peer = PeerKey::from("abcdef");
        let first = writer_id(&peer);
        let second = writer_id(&peer);

        assert!(first.starts_with("abcdef:"));
        assert_ne!(first, second);
    }
}
