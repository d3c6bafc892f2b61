//! Hub protocol events
//!
//! Every websocket frame is a JSON text frame of the form
//! `{"event": "<Name>", "payload": {...}}`. Routing happens by matching
//! on these enums, never on the event name string.
use crate::auction::BidNotification;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Events sent by clients to the hub
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientEvent {
    NotifyNewBid(BidNotification),
}

/// Events pushed by the hub to clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerEvent {
    /// Greeting sent once the connection is registered
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: ConnectionId,
    },
    /// Someone placed a bid; sent to every connection
    ReceiveNewBid(BidNotification),
    /// Someone else placed a bid on an auction you bid on
    NotifyOutbid(BidNotification),
    /// The last frame sent by this connection was rejected
    Error { message: String },
}

#[derive(Error, Debug)]
#[error("malformed payload: {0}")]
pub struct MalformedPayload(#[from] serde_json::Error);

#[derive(Error, Debug)]
#[error("cannot encode event: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, MalformedPayload> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerEvent {
    pub fn parse(text: &str) -> Result<Self, MalformedPayload> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_parse_errors_are_told_apart() {
        let err = || serde_json::from_str::<u32>("x").unwrap_err();

        assert!(EncodeError::from(err())
            .to_string()
            .starts_with("cannot encode event"));
        assert!(MalformedPayload::from(err())
            .to_string()
            .starts_with("malformed payload"));
    }
}
