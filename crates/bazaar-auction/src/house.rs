//! The auction house: validated operations over the replicated store.

use bazaar_store::{ReplicatedStore, StoreError, Version};
use bazaar_types::{Amount, Auction, BidPlaced, Notice, PeerKey};
use tracing::{debug, info, warn};

use crate::{apply_bid, apply_close, AuctionError, Notifier, Result};

/// Runs auctions against a replicated store.
///
/// Each operation reads the current record, validates the request, writes
/// the full updated record conditioned on the version it read, and then
/// notifies connected peers.
#[derive(Debug)]
pub struct AuctionHouse<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> AuctionHouse<S, N>
where
    S: ReplicatedStore,
    N: Notifier,
{
    /// Creates an auction house over `store`.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads an auction and the version it was read at.
    async fn load(&self, name: &str) -> Result<Option<(Auction, Version)>> {
        let Some(current) = self.store.get(name).await? else {
            return Ok(None);
        };

        let mut auction: Auction =
            serde_json::from_value(current.value).map_err(|source| AuctionError::InvalidRecord {
                name: name.to_string(),
                source,
            })?;
        if auction.name.is_empty() {
            auction.name = name.to_string();
        }

        Ok(Some((auction, current.version)))
    }

    async fn load_existing(&self, name: &str) -> Result<(Auction, Version)> {
        self.load(name).await?.ok_or_else(|| AuctionError::NotFound {
            name: name.to_string(),
        })
    }

    /// Writes the record if the store still holds `expected`.
    async fn save(&self, auction: &Auction, expected: Option<&Version>) -> Result<Version> {
        let value = serde_json::to_value(auction)?;
        self.store
            .put_if(&auction.name, value, expected)
            .await
            .map_err(|e| match e {
                StoreError::Conflict { .. } if expected.is_none() => AuctionError::AlreadyExists {
                    name: auction.name.clone(),
                },
                StoreError::Conflict { .. } => AuctionError::Conflict {
                    name: auction.name.clone(),
                },
            })
    }

    /// Gets an auction by name.
    pub async fn get(&self, name: &str) -> Result<Option<Auction>> {
        Ok(self.load(name).await?.map(|(auction, _)| auction))
    }

    /// Lists every auction in the local replica, ordered by name.
    ///
    /// Records that cannot be decoded are skipped.
    pub async fn list(&self) -> Result<Vec<Auction>> {
        let mut auctions = Vec::new();

        for (name, current) in self.store.scan().await? {
            match serde_json::from_value::<Auction>(current.value) {
                Ok(mut auction) => {
                    if auction.name.is_empty() {
                        auction.name = name;
                    }
                    auctions.push(auction);
                }
                Err(e) => warn!(auction = %name, error = %e, "Skipping undecodable record"),
            }
        }

        Ok(auctions)
    }

    /// Opens a new auction named `name` at `price`.
    pub async fn open(&self, name: &str, price: Amount, seller: &PeerKey) -> Result<Auction> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuctionError::InvalidName(name.to_string()));
        }

        // Any record under the name blocks it, decodable or not.
        if self.store.get(name).await?.is_some() {
            return Err(AuctionError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let auction = Auction::new(name, price, seller.clone());
        self.save(&auction, None).await?;

        info!(auction = %name, price = %price, seller = %seller.short(), "Auction opened");
        self.notifier.notify(Notice::AuctionUpdated(auction.clone()));

        Ok(auction)
    }

    /// Places a bid of `amount` on behalf of `buyer`.
    pub async fn bid(&self, name: &str, amount: Amount, buyer: &PeerKey) -> Result<Auction> {
        let name = name.trim();
        let (mut auction, version) = self.load_existing(name).await?;

        apply_bid(&mut auction, amount, buyer)?;
        self.save(&auction, Some(&version)).await?;

        info!(auction = %name, amount = %amount, buyer = %buyer.short(), "Bid accepted");
        self.notifier.notify(Notice::BidPlaced(BidPlaced {
            name: auction.name.clone(),
            amount,
            buyer: buyer.clone(),
        }));

        Ok(auction)
    }

    /// Closes an auction on behalf of `requester`, who must be the seller.
    ///
    /// Closing an already closed auction returns it unchanged without
    /// writing or notifying.
    pub async fn close(&self, name: &str, requester: &PeerKey) -> Result<Auction> {
        let name = name.trim();
        let (mut auction, version) = self.load_existing(name).await?;

        if !apply_close(&mut auction, requester)? {
            debug!(auction = %name, "Auction already closed");
            return Ok(auction);
        }
        self.save(&auction, Some(&version)).await?;

        info!(
            auction = %name,
            last_bid = %auction.last_bid,
            buyer = %auction.buyer.short(),
            "Auction closed"
        );
        self.notifier.notify(Notice::AuctionUpdated(auction.clone()));

        Ok(auction)
    }
}
