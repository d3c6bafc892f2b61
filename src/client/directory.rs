use super::ClientError;
use crate::auction::Auction;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Where the initial auction list comes from
#[async_trait]
pub trait AuctionDirectory {
    async fn list_auctions(&self) -> Result<Vec<Auction>, ClientError>;
}

pub type SharedAuctionDirectory = Arc<dyn AuctionDirectory + Send + Sync + 'static>;

/// `GET /auctions` on the hub server
#[derive(Clone, Debug)]
pub struct HttpAuctionDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuctionDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn new_shared(base_url: impl Into<String>) -> SharedAuctionDirectory {
        Arc::new(Self::new(base_url))
    }
}

#[async_trait]
impl AuctionDirectory for HttpAuctionDirectory {
    async fn list_auctions(&self) -> Result<Vec<Auction>, ClientError> {
        let url = format!("{}/auctions", self.base_url);
        debug!(%url, "fetching auctions");
        Ok(self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}
