//! The auction record.

use serde::{Deserialize, Serialize};

use crate::{Amount, PeerKey};

/// An auction as stored in the replicated log under its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    /// Name of the auctioned item; also the store key.
    #[serde(default)]
    pub name: String,
    /// Peer that opened the auction.
    pub seller: PeerKey,
    /// Current highest bidder, the seller until the first bid.
    pub buyer: PeerKey,
    /// Current highest bid, the opening price until the first bid.
    pub last_bid: Amount,
    /// Whether the auction still accepts bids.
    pub open: bool,
}

impl Auction {
    /// Creates a freshly opened auction.
    pub fn new(name: impl Into<String>, price: Amount, seller: PeerKey) -> Self {
        Self {
            name: name.into(),
            buyer: seller.clone(),
            seller,
            last_bid: price,
            open: true,
        }
    }

    /// Returns true if the auction accepts bids.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true if `peer` opened this auction.
    #[must_use]
    pub fn is_seller(&self, peer: &PeerKey) -> bool {
        &self.seller == peer
    }

    /// Returns true if somebody other than the seller holds the highest bid.
    #[must_use]
    pub fn has_bids(&self) -> bool {
        self.buyer != self.seller
    }
}

impl std::fmt::Display for Auction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] last bid {} by {} (seller {})",
            self.name,
            if self.open { "open" } else { "closed" },
            self.last_bid,
            self.buyer.short(),
            self.seller.short()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_auction_is_open_with_seller_as_buyer() {
        let auction = Auction::new("chair", Amount::from(10), PeerKey::from("peerA"));

        assert!(auction.is_open());
        assert_eq!(auction.buyer, auction.seller);
        assert_eq!(auction.last_bid, Amount::from(10));
        assert!(!auction.has_bids());
        assert!(auction.is_seller(&PeerKey::from("peerA")));
        assert!(!auction.is_seller(&PeerKey::from("peerB")));
    }

    #[test]
    fn test_serializes_camel_case() {
        let auction = Auction::new("chair", Amount::from(10), PeerKey::from("peerA"));
        let json = serde_json::to_value(&auction).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "chair",
                "seller": "peerA",
                "buyer": "peerA",
                "lastBid": 10.0,
                "open": true
            })
        );
    }

    #[test]
    fn test_deserializes_legacy_record() {
        // Price stored as text, no name, extra fields.
        let json = r#"{"seller":"a","buyer":"b","lastBid":"12","open":false,"extra":1}"#;
        let auction: Auction = serde_json::from_str(json).unwrap();

        assert_eq!(auction.name, "");
        assert_eq!(auction.last_bid, Amount::from(12));
        assert!(!auction.is_open());
        assert!(auction.has_bids());
    }
}
