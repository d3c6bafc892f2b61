//! Interactive console front-end of the client
use crate::{
    auction::Auction,
    client::{ClientSession, SessionObserver},
    service::ServiceControl,
};
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub fn format_row(auction: &Auction) -> String {
    format!(
        "{:<3} {:<20} {:>10}",
        auction.id, auction.item_name, auction.current_bid
    )
}

pub fn print_auctions(auctions: &[Auction]) {
    for auction in auctions {
        println!("{}", format_row(auction));
    }
}

/// Prints whatever the session applies
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn new_bid(&self, auction: &Auction) {
        println!("New bid:");
        println!("{}", format_row(auction));
    }

    fn outbid(&self, auction: &Auction) {
        println!("You have been outbid on auction {}:", auction.id);
        println!("{}", format_row(auction));
    }

    fn rejected(&self, message: &str) {
        println!("Bid rejected: {message}");
    }
}

/// Read auction ids and bids from `input` and submit them
///
/// Returns on end of input or once the services are stopped.
pub async fn run_bid_loop<R>(
    session: &ClientSession,
    input: R,
    svc_ctl: &ServiceControl,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        println!("Auction id?");
        let Some(auction_id) = next_number(&mut lines, svc_ctl).await? else {
            return Ok(());
        };
        println!("New bid for auction {auction_id}?");
        let Some(new_bid) = next_number(&mut lines, svc_ctl).await? else {
            return Ok(());
        };

        session.submit_bid(auction_id, new_bid)?;
        println!("Bid placed");
    }
}

/// Run the bid loop, then disconnect whatever way the loop ended
pub async fn run_session<R>(session: ClientSession, input: R, svc_ctl: &ServiceControl) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let res = run_bid_loop(&session, input, svc_ctl).await;
    session.disconnect().await;
    res
}

async fn next_number<R>(lines: &mut Lines<R>, svc_ctl: &ServiceControl) -> Result<Option<i64>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = tokio::select! {
            _ = svc_ctl.stopped() => return Ok(None),
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            return Ok(None);
        };

        match line.trim().parse() {
            Ok(n) => return Ok(Some(n)),
            Err(_) => println!("Not a number: {}", line.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_aligned() {
        assert_eq!(
            format_row(&Auction::new(1, "Vase", 75)),
            "1   Vase                         75"
        );
    }
}
