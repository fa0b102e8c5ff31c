//! TCP transport.
//!
//! Connections carry length-delimited frames. After a handshake that
//! checks both peers joined the same topic, every session gets a writer
//! task fed by its [`PeerSession`] handle and a reader task that reports
//! frames and the final disconnect as [`TransportEvent`]s.

use bazaar_types::PeerKey;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};
use tracing::{debug, info, warn};

use crate::{
    Direction, Frame, Hello, P2pError, PeerSession, Result, SessionId, MAX_FRAME_LENGTH,
};

/// Transport settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Identity announced in the handshake.
    pub local: PeerKey,
    /// Topic peers must share.
    pub topic: String,
}

/// Connection lifecycle events delivered to the application.
#[derive(Debug)]
pub enum TransportEvent {
    /// A handshake completed.
    Connected(PeerSession),
    /// A frame arrived on a session.
    Frame {
        /// Session the frame arrived on.
        session: SessionId,
        /// Peer that sent it.
        peer: PeerKey,
        /// The frame.
        frame: Frame,
    },
    /// A session ended.
    Disconnected {
        /// Session that ended.
        session: SessionId,
        /// Peer on the other end.
        peer: PeerKey,
    },
}

/// TCP transport handle.
#[derive(Debug, Clone)]
pub struct Transport {
    config: Arc<TransportConfig>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

/// Pause after a failed `accept` before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

impl Transport {
    /// Creates a transport and the receiver for its events.
    pub fn new(config: TransportConfig) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let transport = Self {
            config: Arc::new(config),
            events,
        };
        (transport, receiver)
    }

    /// Returns the transport settings.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Starts accepting connections on `addr`.
    ///
    /// Returns the bound address, which differs from `addr` when port 0
    /// was requested.
    pub async fn listen(&self, addr: SocketAddr) -> Result<SocketAddr> {
        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;
        info!(addr = %bound, topic = %self.config.topic, "Listening for peers");

        let transport = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, remote)) => {
                        let transport = transport.clone();
                        tokio::spawn(async move {
                            if let Err(e) = transport.establish(stream, remote, Direction::Inbound).await {
                                warn!(addr = %remote, error = %e, "Inbound connection rejected");
                            }
                        });
                    }
                    Err(e) => {
                        // Errors like EMFILE persist; don't spin on them.
                        warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }

                if transport.events.is_closed() {
                    debug!("Event receiver gone, stopping listener");
                    break;
                }
            }
        });

        Ok(bound)
    }

    /// Connects to a peer and returns its identity.
    pub async fn dial(&self, addr: SocketAddr) -> Result<PeerKey> {
        debug!(addr = %addr, "Dialing peer");
        let stream = TcpStream::connect(addr).await?;
        self.establish(stream, addr, Direction::Outbound).await
    }

    async fn establish(
        &self,
        stream: TcpStream,
        remote: SocketAddr,
        direction: Direction,
    ) -> Result<PeerKey> {
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, codec());
        let mut writer = FramedWrite::new(write_half, codec());

        let hello = Frame::Hello(Hello {
            peer: self.config.local.clone(),
            topic: self.config.topic.clone(),
        });
        writer.send(hello.encode()?).await?;

        let first = reader
            .next()
            .await
            .ok_or_else(|| P2pError::Handshake("connection closed before hello".into()))??;
        let remote_hello = match Frame::decode(&first)? {
            Frame::Hello(hello) => hello,
            other => {
                return Err(P2pError::Handshake(format!(
                    "expected hello, got {:?} frame",
                    other.kind()
                )))
            }
        };

        if remote_hello.topic != self.config.topic {
            return Err(P2pError::TopicMismatch {
                expected: self.config.topic.clone(),
                found: remote_hello.topic,
            });
        }
        if remote_hello.peer == self.config.local {
            return Err(P2pError::Handshake("connected to self".into()));
        }

        let (session, mut outbound) = PeerSession::new(remote_hello.peer, remote, direction);
        let session_id = session.id;
        let peer = session.peer.clone();

        tokio::spawn(async move {
            while let Some(frame) = outbound.recv().await {
                let bytes: Bytes = match frame.encode() {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(session = %session_id, error = %e, "Failed to encode frame");
                        continue;
                    }
                };
                if let Err(e) = writer.send(bytes).await {
                    debug!(session = %session_id, error = %e, "Session writer stopped");
                    break;
                }
            }
        });

        self.events
            .send(TransportEvent::Connected(session))
            .map_err(|_| P2pError::ChannelClosed)?;

        let events = self.events.clone();
        let reader_peer = peer.clone();
        tokio::spawn(async move {
            while let Some(next) = reader.next().await {
                let bytes = match next {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        debug!(session = %session_id, error = %e, "Session reader stopped");
                        break;
                    }
                };
                match Frame::decode(&bytes) {
                    Ok(frame) => {
                        let event = TransportEvent::Frame {
                            session: session_id,
                            peer: reader_peer.clone(),
                            frame,
                        };
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        debug!(session = %session_id, error = %e, "Dropping malformed frame");
                    }
                }
            }

            let _ = events.send(TransportEvent::Disconnected {
                session: session_id,
                peer: reader_peer,
            });
        });

        Ok(peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn transport(peer: &str, topic: &str) -> (Transport, mpsc::UnboundedReceiver<TransportEvent>) {
        Transport::new(TransportConfig {
            local: PeerKey::from(peer),
            topic: topic.to_string(),
        })
    }

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEvent {
        timeout(WAIT, rx.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_dial_and_exchange_data() {
        let (alice, mut alice_rx) = transport("alice", "bazaar");
        let (bob, mut bob_rx) = transport("bob", "bazaar");
        let addr = alice.listen(loopback()).await.unwrap();

        assert_eq!(bob.dial(addr).await.unwrap(), PeerKey::from("alice"));

        let bob_session = match next_event(&mut bob_rx).await {
            TransportEvent::Connected(session) => session,
            other => panic!("expected connect, got {other:?}"),
        };
        let alice_session = match next_event(&mut alice_rx).await {
            TransportEvent::Connected(session) => session,
            other => panic!("expected connect, got {other:?}"),
        };
        assert_eq!(alice_session.peer, PeerKey::from("bob"));
        assert_eq!(alice_session.direction, Direction::Inbound);
        assert_eq!(bob_session.direction, Direction::Outbound);

        bob_session
            .send(Frame::Data(Bytes::from_static(b"ping")))
            .unwrap();
        match next_event(&mut alice_rx).await {
            TransportEvent::Frame { peer, frame, .. } => {
                assert_eq!(peer, PeerKey::from("bob"));
                assert_eq!(frame, Frame::Data(Bytes::from_static(b"ping")));
            }
            other => panic!("expected frame, got {other:?}"),
        }

        // Dropping every handle to bob's session closes the connection.
        drop(bob_session);
        match next_event(&mut alice_rx).await {
            TransportEvent::Disconnected { session, .. } => assert_eq!(session, alice_session.id),
            other => panic!("expected disconnect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_topic_mismatch_is_rejected() {
        let (alice, _alice_rx) = transport("alice", "bazaar");
        let (bob, _bob_rx) = transport("bob", "other");
        let addr = alice.listen(loopback()).await.unwrap();

        let err = bob.dial(addr).await.unwrap_err();
        assert!(matches!(err, P2pError::TopicMismatch { .. }));
    }

    #[tokio::test]
    async fn test_self_connection_is_rejected() {
        let (alice, _alice_rx) = transport("alice", "bazaar");
        let addr = alice.listen(loopback()).await.unwrap();

        let err = alice.dial(addr).await.unwrap_err();
        assert!(matches!(err, P2pError::Handshake(_)));
    }
}
