//! Notification Hub
//!
//! Routes bid events to their audience. Each connection is an unbounded
//! channel of [`ServerEvent`]s drained by its websocket writer, so
//! broadcasting never waits on a slow recipient. Connections join the
//! group of an auction the first time they bid on it and never leave it.
use crate::{
    auction::{BidNotification, GroupName},
    event::{ClientEvent, ConnectionId, MalformedPayload, ServerEvent},
    store::SharedAuctionStore,
};
use dashmap::DashMap;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
#[allow(unused)]
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;
pub type SharedHub = Arc<NotificationHub>;

#[derive(Error, Debug)]
pub enum HubError {
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),
}

pub struct NotificationHub {
    connections: DashMap<ConnectionId, EventSender>,
    groups: DashMap<GroupName, HashSet<ConnectionId>>,
    store: SharedAuctionStore,
}

impl NotificationHub {
    pub fn new(store: SharedAuctionStore) -> Self {
        Self {
            connections: DashMap::new(),
            groups: DashMap::new(),
            store,
        }
    }

    pub fn new_shared(store: SharedAuctionStore) -> SharedHub {
        Arc::new(Self::new(store))
    }

    /// Register a new connection and greet it with its id
    pub fn connect(&self, tx: EventSender) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        // nobody else knows the id yet, so the greeting is always first
        let _ = tx.send(ServerEvent::Connected { connection_id });
        self.connections.insert(connection_id, tx);
        debug!(%connection_id, "connection registered");
        connection_id
    }

    /// Forget a connection
    ///
    /// Group membership is kept; anything later routed to this id is dropped.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);
        debug!(%connection_id, "connection removed");
    }

    #[allow(unused)]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[allow(unused)]
    pub fn group_members(&self, group: &GroupName) -> Vec<ConnectionId> {
        self.groups
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Parse a raw text frame and dispatch it
    ///
    /// A frame that does not parse is rejected before anything is broadcast.
    pub fn handle_text(&self, source: ConnectionId, text: &str) -> Result<(), HubError> {
        let event = ClientEvent::parse(text)?;
        self.dispatch(source, event);
        Ok(())
    }

    pub fn dispatch(&self, source: ConnectionId, event: ClientEvent) {
        debug!(%source, ?event, "event");
        match event {
            ClientEvent::NotifyNewBid(notification) => self.notify_new_bid(source, notification),
        }
    }

    pub fn notify_new_bid(&self, source: ConnectionId, notification: BidNotification) {
        let group = notification.group();

        // The entry guard serializes store write, membership change and both
        // fan-outs per group, so the last bid broadcast is the one stored.
        // Other groups are not blocked.
        let mut members = self.groups.entry(group.clone()).or_default();

        if let Err(e) = self
            .store
            .place_bid(notification.auction_id, notification.new_bid)
        {
            warn!(%source, error = %e, "bid not recorded in the store");
        }

        members.insert(source);

        let outbid = ServerEvent::NotifyOutbid(notification);
        for member in members.iter().filter(|member| **member != source) {
            self.send_to(*member, outbid.clone());
        }
        trace!(%group, members = members.len(), "outbid sent to group");

        self.send_all(ServerEvent::ReceiveNewBid(notification));
    }

    /// Send to a single connection; gone connections are skipped silently
    pub fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) {
        match self.connections.get(&connection_id) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    trace!(%connection_id, "connection closed, event dropped");
                }
            }
            None => trace!(%connection_id, "not connected, event dropped"),
        }
    }

    pub fn send_all(&self, event: ServerEvent) {
        for entry in self.connections.iter() {
            if entry.value().send(event.clone()).is_err() {
                trace!(connection_id = %entry.key(), "connection closed, event dropped");
            }
        }
    }
}
