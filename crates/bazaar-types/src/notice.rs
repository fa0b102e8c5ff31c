//! Notices exchanged on the peer data channel.

use serde::{Deserialize, Serialize};

use crate::{Amount, Auction, PeerKey};

/// A bid change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidPlaced {
    /// Auction name.
    pub name: String,
    /// Accepted bid.
    #[serde(alias = "bid")]
    pub amount: Amount,
    /// Peer that placed the bid.
    pub buyer: PeerKey,
}

/// A state change notification.
///
/// The payload carries no tag on the wire; the shape decides the variant.
/// Payloads that are valid JSON but match neither shape are kept as
/// [`Notice::Unrecognized`] so newer peers do not get dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notice {
    /// A full record, sent when an auction is opened or closed.
    AuctionUpdated(Auction),
    /// A bid was accepted.
    BidPlaced(BidPlaced),
    /// Any other JSON payload.
    Unrecognized(serde_json::Value),
}

impl Notice {
    /// Name of the auction the notice refers to, if known.
    #[must_use]
    pub fn auction_name(&self) -> Option<&str> {
        match self {
            Notice::AuctionUpdated(auction) => Some(&auction.name),
            Notice::BidPlaced(bid) => Some(&bid.name),
            Notice::Unrecognized(value) => value.get("name").and_then(|n| n.as_str()),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::AuctionUpdated(auction) if auction.open => write!(f, "opened: {auction}"),
            Notice::AuctionUpdated(auction) => write!(f, "closed: {auction}"),
            Notice::BidPlaced(bid) => write!(
                f,
                "bid: {} on {} by {}",
                bid.amount,
                bid.name,
                bid.buyer.short()
            ),
            Notice::Unrecognized(value) => write!(f, "message: {value}"),
        }
    }
}

/// Wire wrapper: `{"message": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The wrapped notice.
    pub message: Notice,
}

impl From<Notice> for Envelope {
    fn from(message: Notice) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record_decodes_as_auction() {
        let json = r#"{"message":{"name":"chair","seller":"a","buyer":"a","lastBid":10,"open":true}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();

        match envelope.message {
            Notice::AuctionUpdated(auction) => assert_eq!(auction.name, "chair"),
            other => panic!("expected auction, got {other:?}"),
        }
    }

    #[test]
    fn test_bid_payload_accepts_legacy_field_name() {
        let json = r#"{"message":{"name":"chair","bid":"15","buyer":"b"}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();

        assert_eq!(
            envelope.message,
            Notice::BidPlaced(BidPlaced {
                name: "chair".to_string(),
                amount: Amount::from(15),
                buyer: PeerKey::from("b"),
            })
        );
    }

    #[test]
    fn test_unknown_shape_is_kept() {
        let json = r#"{"message":{"name":"chair","kind":"future"}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();

        assert!(matches!(envelope.message, Notice::Unrecognized(_)));
        assert_eq!(envelope.message.auction_name(), Some("chair"));
    }

    #[test]
    fn test_bid_serializes_flat() {
        let notice = Notice::BidPlaced(BidPlaced {
            name: "chair".to_string(),
            amount: Amount::from(15),
            buyer: PeerKey::from("b"),
        });
        let json = serde_json::to_value(Envelope::from(notice)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"message": {"name": "chair", "amount": 15.0, "buyer": "b"}})
        );
    }

    #[test]
    fn test_missing_envelope_fails() {
        assert!(serde_json::from_str::<Envelope>(r#"{"name":"chair"}"#).is_err());
        assert!(serde_json::from_str::<Envelope>("{\"message\":").is_err());
    }
}
