use serde::{Deserialize, Serialize};
use std::fmt;

pub type AuctionId = i64;
pub type Amount = i64;

/// An auction as listed by the store and cached by clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: AuctionId,
    pub item_name: String,
    pub current_bid: Amount,
}

impl Auction {
    pub fn new(id: AuctionId, item_name: impl Into<String>, current_bid: Amount) -> Self {
        Self {
            id,
            item_name: item_name.into(),
            current_bid,
        }
    }
}

/// A new bid on an auction, as it travels over the hub
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidNotification {
    pub auction_id: AuctionId,
    pub new_bid: Amount,
}

impl BidNotification {
    pub fn new(auction_id: AuctionId, new_bid: Amount) -> Self {
        Self { auction_id, new_bid }
    }

    pub fn group(&self) -> GroupName {
        GroupName::for_auction(self.auction_id)
    }
}

/// Name of the hub group of everyone who bid on an auction
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupName(String);

impl GroupName {
    pub fn for_auction(auction_id: AuctionId) -> Self {
        Self(format!("auction-{auction_id}"))
    }

    #[allow(unused)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
