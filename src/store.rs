//! Auction store
//!
//! Holds the current state of every auction. The hub and the HTTP
//! surface only go through the [`AuctionStore`] trait; the only
//! implementation shipped keeps everything in memory.
mod in_memory;

pub use self::in_memory::*;

use crate::auction::{Amount, Auction, AuctionId};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown auction: {0}")]
    UnknownAuction(AuctionId),
}

pub trait AuctionStore {
    /// All auctions, ordered by id
    fn list_auctions(&self) -> Vec<Auction>;

    fn get_auction(&self, auction_id: AuctionId) -> Option<Auction>;

    /// Record a new current bid. No bid validation is performed.
    fn place_bid(&self, auction_id: AuctionId, new_bid: Amount) -> Result<(), StoreError>;
}

pub type SharedAuctionStore = Arc<dyn AuctionStore + Send + Sync + 'static>;
