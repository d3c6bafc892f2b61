use super::*;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

/// Fake in-memory auction store.
///
/// Good enough for the demo server and for unit-tests.
#[derive(Debug, Default)]
pub struct InMemoryAuctionStore {
    auctions: RwLock<BTreeMap<AuctionId, Auction>>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auctions(auctions: impl IntoIterator<Item = Auction>) -> Self {
        let store = Self::new();
        for auction in auctions {
            store.add_auction(auction);
        }
        store
    }

    /// The items the demo server starts with
    pub fn seeded() -> Self {
        Self::with_auctions([
            Auction::new(1, "Gothic Revival Clock", 100),
            Auction::new(2, "Ming Dynasty Vase", 250),
            Auction::new(3, "Victorian Armchair", 75),
            Auction::new(4, "Persian Rug", 400),
        ])
    }

    pub fn add_auction(&self, auction: Auction) {
        self.auctions.write().insert(auction.id, auction);
    }
}

impl AuctionStore for InMemoryAuctionStore {
    fn list_auctions(&self) -> Vec<Auction> {
        self.auctions.read().values().cloned().collect()
    }

    fn get_auction(&self, auction_id: AuctionId) -> Option<Auction> {
        self.auctions.read().get(&auction_id).cloned()
    }

    fn place_bid(&self, auction_id: AuctionId, new_bid: Amount) -> Result<(), StoreError> {
        let mut auctions = self.auctions.write();
        let auction = auctions
            .get_mut(&auction_id)
            .ok_or(StoreError::UnknownAuction(auction_id))?;
        debug!(auction_id, old = auction.current_bid, new = new_bid, "bid stored");
        auction.current_bid = new_bid;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_bid_on_unknown_auction_fails() {
        let store = InMemoryAuctionStore::with_auctions([Auction::new(1, "Vase", 50)]);

        assert_eq!(store.place_bid(2, 10), Err(StoreError::UnknownAuction(2)));
        assert_eq!(store.place_bid(1, 10), Ok(()));
        // no validation: lower bids are accepted too
        assert_eq!(store.get_auction(1).unwrap().current_bid, 10);
    }

    #[test]
    fn listing_is_ordered_by_id() {
        let store = InMemoryAuctionStore::seeded();
        let ids: Vec<_> = store.list_auctions().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
