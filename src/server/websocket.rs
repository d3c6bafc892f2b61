use super::AppState;
use crate::{
    event::{ConnectionId, ServerEvent},
    hub::SharedHub,
    service::JoinHandle,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub async fn hub_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.hub))
}

async fn handle_connection(socket: WebSocket, hub: SharedHub) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let connection_id = hub.connect(tx);

    let writer = JoinHandle::spawn(async move {
        while let Some(event) = rx.recv().await {
            ws_sender.send(Message::Text(event.to_json()?)).await?;
        }
        Ok(())
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => handle_text(&hub, connection_id, &text),
            Ok(Message::Binary(_)) => {
                warn!(%connection_id, "binary frame rejected");
                hub.send_to(
                    connection_id,
                    ServerEvent::Error {
                        message: "binary frames are not supported".to_owned(),
                    },
                );
            }
            Ok(Message::Close(_)) => break,
            // ping/pong are answered by the websocket layer
            Ok(_) => {}
            Err(e) => {
                debug!(%connection_id, error = %e, "websocket error");
                break;
            }
        }
    }

    // dropping the hub's sender lets the writer drain and finish
    hub.disconnect(connection_id);
    if let Err(e) = writer.join().await {
        debug!(%connection_id, error = %e, "writer stopped");
    }
    debug!(%connection_id, "connection closed");
}

fn handle_text(hub: &SharedHub, connection_id: ConnectionId, text: &str) {
    if let Err(e) = hub.handle_text(connection_id, text) {
        warn!(%connection_id, error = %e, "frame rejected");
        hub.send_to(
            connection_id,
            ServerEvent::Error {
                message: e.to_string(),
            },
        );
    }
}
