//! Pure state transitions on an auction record.

use bazaar_types::{Amount, Auction, PeerKey};

use crate::{AuctionError, Result};

/// Accepts `amount` from `buyer` as the new highest bid.
///
/// Fails if the auction is closed or `amount` does not exceed the current
/// bid. On failure the record is left untouched.
pub fn apply_bid(auction: &mut Auction, amount: Amount, buyer: &PeerKey) -> Result<()> {
    if !auction.is_open() {
        return Err(AuctionError::AuctionClosed {
            name: auction.name.clone(),
        });
    }

    if amount <= auction.last_bid {
        return Err(AuctionError::BidTooLow {
            name: auction.name.clone(),
            bid: amount,
            current: auction.last_bid,
        });
    }

    auction.buyer = buyer.clone();
    auction.last_bid = amount;
    Ok(())
}

/// Closes the auction on behalf of `requester`.
///
/// Only the seller may close. Returns `false` if the auction was already
/// closed, in which case nothing changes.
pub fn apply_close(auction: &mut Auction, requester: &PeerKey) -> Result<bool> {
    if !auction.is_seller(requester) {
        return Err(AuctionError::Unauthorized {
            name: auction.name.clone(),
            requester: requester.clone(),
        });
    }

    if !auction.is_open() {
        return Ok(false);
    }

    auction.open = false;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chair() -> Auction {
        Auction::new("chair", Amount::from(10), PeerKey::from("peerA"))
    }

    #[test]
    fn test_higher_bid_is_accepted() {
        let mut auction = chair();
        apply_bid(&mut auction, Amount::from(15), &PeerKey::from("peerB")).unwrap();

        assert_eq!(auction.last_bid, Amount::from(15));
        assert_eq!(auction.buyer, PeerKey::from("peerB"));
        assert_eq!(auction.seller, PeerKey::from("peerA"));
    }

    #[test]
    fn test_equal_bid_is_too_low() {
        let mut auction = chair();
        let before = auction.clone();

        let err = apply_bid(&mut auction, Amount::from(10), &PeerKey::from("peerB")).unwrap_err();
        assert!(matches!(err, AuctionError::BidTooLow { .. }));
        assert_eq!(auction, before);
    }

    #[test]
    fn test_bid_on_closed_auction() {
        let mut auction = chair();
        auction.open = false;
        let before = auction.clone();

        let err = apply_bid(&mut auction, Amount::from(100), &PeerKey::from("peerD")).unwrap_err();
        assert!(matches!(err, AuctionError::AuctionClosed { .. }));
        assert_eq!(auction, before);
    }

    #[test]
    fn test_close_by_seller_then_again() {
        let mut auction = chair();
        let seller = PeerKey::from("peerA");

        assert!(apply_close(&mut auction, &seller).unwrap());
        assert!(!auction.is_open());
        assert!(!apply_close(&mut auction, &seller).unwrap());
        assert!(!auction.is_open());
    }

    #[test]
    fn test_close_by_other_peer_regardless_of_state() {
        let mut auction = chair();
        let intruder = PeerKey::from("peerB");

        assert!(matches!(
            apply_close(&mut auction, &intruder),
            Err(AuctionError::Unauthorized { .. })
        ));

        auction.open = false;
        assert!(matches!(
            apply_close(&mut auction, &intruder),
            Err(AuctionError::Unauthorized { .. })
        ));
    }
}
