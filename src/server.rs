//! Hub server
//!
//! The HTTP surface around the [`NotificationHub`]: the auction listing,
//! the plain store update route, and the websocket endpoint of the hub.
//!
//! [`NotificationHub`]: crate::hub::NotificationHub
mod websocket;

use crate::{
    auction::{Amount, Auction, AuctionId},
    hub::SharedHub,
    service::{JoinHandle, ServiceControl},
    store::{SharedAuctionStore, StoreError},
};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedAuctionStore,
    pub hub: SharedHub,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auctions", get(list_auctions))
        .route("/auction/:id/newbid", post(new_bid))
        .route("/auctionhub", get(websocket::hub_handler))
        .with_state(state)
}

async fn list_auctions(State(state): State<AppState>) -> Json<Vec<Auction>> {
    Json(state.store.list_auctions())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewBidQuery {
    current_bid: Amount,
}

/// Store-only update; does not notify anyone
async fn new_bid(
    State(state): State<AppState>,
    Path(auction_id): Path<AuctionId>,
    Query(query): Query<NewBidQuery>,
) -> Result<Json<Auction>, StatusCode> {
    debug!(auction_id, new_bid = query.current_bid, "new bid over http");
    match state.store.place_bid(auction_id, query.current_bid) {
        Ok(()) => state
            .store
            .get_auction(auction_id)
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND),
        Err(StoreError::UnknownAuction(_)) => Err(StatusCode::NOT_FOUND),
    }
}

/// Bind the server and run it until the services are stopped
///
/// Returns the address actually bound, which matters when
/// listening on port 0.
pub async fn bind(
    listen: SocketAddr,
    state: AppState,
    svc_ctl: &ServiceControl,
) -> Result<(SocketAddr, JoinHandle)> {
    let server = axum::Server::try_bind(&listen)?.serve(router(state).into_make_service());
    let local_addr = server.local_addr();
    info!(%local_addr, "hub listening");

    let handle = svc_ctl.spawn("hub-server", {
        let svc_ctl = svc_ctl.clone();
        async move {
            server
                .with_graceful_shutdown(async move { svc_ctl.stopped().await })
                .await?;
            Ok(())
        }
    });

    Ok((local_addr, handle))
}
