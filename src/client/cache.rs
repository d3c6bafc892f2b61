use crate::auction::{Auction, AuctionId, BidNotification};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct CachedAuction {
    auction: Auction,
    outbid: bool,
}

/// Local view of the auctions, shared between the hub reader and the user
///
/// Every update is a read-modify-write under one lock. Auctions are only
/// ever updated, never created from a notification.
#[derive(Clone, Debug, Default)]
pub struct AuctionCache {
    inner: Arc<Mutex<Vec<CachedAuction>>>,
}

impl AuctionCache {
    pub fn new(auctions: impl IntoIterator<Item = Auction>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(
                auctions
                    .into_iter()
                    .map(|auction| CachedAuction {
                        auction,
                        outbid: false,
                    })
                    .collect(),
            )),
        }
    }

    fn update(
        &self,
        auction_id: AuctionId,
        f: impl FnOnce(&mut CachedAuction),
    ) -> Option<Auction> {
        let mut inner = self.inner.lock();
        let cached = inner.iter_mut().find(|c| c.auction.id == auction_id)?;
        f(cached);
        Some(cached.auction.clone())
    }

    /// Set the current bid of a cached auction; `None` if it is not cached
    pub fn apply_new_bid(&self, notification: &BidNotification) -> Option<Auction> {
        self.update(notification.auction_id, |cached| {
            cached.auction.current_bid = notification.new_bid
        })
    }

    pub fn mark_outbid(&self, notification: &BidNotification) -> Option<Auction> {
        self.update(notification.auction_id, |cached| cached.outbid = true)
    }

    pub fn clear_outbid(&self, auction_id: AuctionId) {
        self.update(auction_id, |cached| cached.outbid = false);
    }

    #[allow(unused)]
    pub fn is_outbid(&self, auction_id: AuctionId) -> bool {
        self.inner
            .lock()
            .iter()
            .any(|c| c.auction.id == auction_id && c.outbid)
    }

    #[allow(unused)]
    pub fn get(&self, auction_id: AuctionId) -> Option<Auction> {
        self.inner
            .lock()
            .iter()
            .find(|c| c.auction.id == auction_id)
            .map(|c| c.auction.clone())
    }

    pub fn snapshot(&self) -> Vec<Auction> {
        self.inner.lock().iter().map(|c| c.auction.clone()).collect()
    }
}
