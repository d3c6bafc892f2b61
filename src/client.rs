//! Client Session
//!
//! One persistent connection to the hub plus a local [`AuctionCache`]
//! kept in sync with the events the hub pushes. Submitting a bid only
//! sends it; the cache changes when the hub echoes the bid back.
mod cache;
mod directory;

pub use self::{cache::*, directory::*};

use crate::{
    auction::{Amount, Auction, AuctionId, BidNotification},
    event::{ClientEvent, ConnectionId, EncodeError, MalformedPayload, ServerEvent},
    service::JoinHandle,
};
use futures::{stream::SplitStream, SinkExt, StreamExt};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// How long to wait for the hub to greet a new connection
const GREETING_TIMEOUT: Duration = Duration::from_secs(10);

type HubStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection failure: {0}")]
    ConnectionFailure(String),
    #[error("session is disconnected")]
    Disconnected,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Gets told about every event the session applied
pub trait SessionObserver {
    fn new_bid(&self, auction: &Auction);
    fn outbid(&self, auction: &Auction);
    fn rejected(&self, message: &str);
}

pub type SharedSessionObserver = Arc<dyn SessionObserver + Send + Sync + 'static>;

/// Fetch the auction list once, producing the authoritative local cache
///
/// Must happen before connecting; bids placed in between are missed.
pub async fn initialize(
    directory: &(dyn AuctionDirectory + Send + Sync),
) -> Result<AuctionCache, ClientError> {
    let auctions = directory.list_auctions().await?;
    debug!(count = auctions.len(), "auctions fetched");
    Ok(AuctionCache::new(auctions))
}

/// Reconcile the cache with a single event from the hub
pub fn handle_server_event(cache: &AuctionCache, observer: &dyn SessionObserver, event: ServerEvent) {
    match event {
        ServerEvent::ReceiveNewBid(notification) => match cache.apply_new_bid(&notification) {
            Some(auction) => observer.new_bid(&auction),
            None => debug!(?notification, "bid for unknown auction ignored"),
        },
        ServerEvent::NotifyOutbid(notification) => match cache.mark_outbid(&notification) {
            Some(auction) => observer.outbid(&auction),
            None => debug!(?notification, "outbid for unknown auction ignored"),
        },
        ServerEvent::Error { message } => observer.rejected(&message),
        ServerEvent::Connected { connection_id } => {
            debug!(%connection_id, "unexpected greeting ignored")
        }
    }
}

pub struct ClientSession {
    connection_id: ConnectionId,
    cache: AuctionCache,
    outbound: mpsc::UnboundedSender<Message>,
    reader: JoinHandle,
    writer: JoinHandle,
}

impl ClientSession {
    /// Open the connection to the hub
    ///
    /// Fails fast; retrying is up to the caller.
    pub async fn connect(
        hub_url: &str,
        cache: AuctionCache,
        observer: SharedSessionObserver,
    ) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(hub_url)
            .await
            .map_err(|e| ClientError::ConnectionFailure(e.to_string()))?;
        let (mut ws_sender, mut ws_receiver) = stream.split();

        let connection_id = read_greeting(&mut ws_receiver).await?;
        debug!(%connection_id, %hub_url, "connected");

        let (outbound, mut rx) = mpsc::unbounded_channel::<Message>();
        let writer = JoinHandle::spawn(async move {
            while let Some(msg) = rx.recv().await {
                ws_sender.send(msg).await?;
            }
            ws_sender.close().await?;
            Ok(())
        });

        let reader = JoinHandle::spawn({
            let cache = cache.clone();
            async move {
                while let Some(msg) = ws_receiver.next().await {
                    match msg? {
                        Message::Text(text) => match ServerEvent::parse(&text) {
                            Ok(event) => handle_server_event(&cache, &*observer, event),
                            Err(e) => warn!(error = %e, "frame ignored"),
                        },
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
                debug!(%connection_id, "hub stream ended");
                Ok(())
            }
        });

        Ok(Self {
            connection_id,
            cache,
            outbound,
            reader,
            writer,
        })
    }

    #[allow(unused)]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    #[allow(unused)]
    pub fn cache(&self) -> &AuctionCache {
        &self.cache
    }

    #[allow(unused)]
    pub fn is_connected(&self) -> bool {
        !self.reader.is_finished() && !self.writer.is_finished()
    }

    /// Send a bid to the hub
    pub fn submit_bid(&self, auction_id: AuctionId, new_bid: Amount) -> Result<(), ClientError> {
        let json = ClientEvent::NotifyNewBid(BidNotification::new(auction_id, new_bid)).to_json()?;
        self.cache.clear_outbid(auction_id);
        self.outbound
            .send(Message::Text(json))
            .map_err(|_| ClientError::Disconnected)?;
        debug!(auction_id, new_bid, "bid submitted");
        Ok(())
    }

    /// Close the connection
    ///
    /// Dropping the session aborts its tasks too, without the close frame.
    pub async fn disconnect(self) {
        let Self {
            connection_id,
            outbound,
            reader,
            writer,
            ..
        } = self;

        // the writer sends a close frame once the channel is closed
        drop(outbound);
        if let Err(e) = writer.join().await {
            debug!(%connection_id, error = %e, "close failed");
        }
        drop(reader);
        debug!(%connection_id, "disconnected");
    }
}

async fn read_greeting(ws_receiver: &mut SplitStream<HubStream>) -> Result<ConnectionId, ClientError> {
    let msg = match tokio::time::timeout(GREETING_TIMEOUT, ws_receiver.next()).await {
        Err(_) => return Err(ClientError::ConnectionFailure("no greeting from hub".to_owned())),
        Ok(None) => {
            return Err(ClientError::ConnectionFailure(
                "hub closed the connection".to_owned(),
            ))
        }
        Ok(Some(msg)) => msg.map_err(|e| ClientError::ConnectionFailure(e.to_string()))?,
    };

    match msg {
        Message::Text(text) => match ServerEvent::parse(&text)? {
            ServerEvent::Connected { connection_id } => Ok(connection_id),
            other => Err(ClientError::ConnectionFailure(format!(
                "unexpected greeting: {other:?}"
            ))),
        },
        other => Err(ClientError::ConnectionFailure(format!(
            "unexpected greeting: {other:?}"
        ))),
    }
}
