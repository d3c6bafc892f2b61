//! Command line and environment configuration.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;

/// Real-time auction bid notifications
#[derive(Parser, Debug)]
#[command(name = "auction-hub", version)]
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the hub server
    Serve(ServerConfig),
    /// Run the interactive console client
    Client(ClientConfig),
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "AUCTION_HUB_LISTEN", default_value = "127.0.0.1:7241")]
    pub listen: SocketAddr,
}

#[derive(Args, Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the hub server
    #[arg(long, env = "AUCTION_HUB_URL", default_value = "http://127.0.0.1:7241")]
    pub url: String,
}

impl ClientConfig {
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Websocket URL of the hub endpoint
    pub fn hub_url(&self) -> Result<String> {
        let base = self.base_url();
        if let Some(rest) = base.strip_prefix("http://") {
            Ok(format!("ws://{rest}/auctionhub"))
        } else if let Some(rest) = base.strip_prefix("https://") {
            Ok(format!("wss://{rest}/auctionhub"))
        } else {
            bail!("unsupported hub url: {base}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> ClientConfig {
        ClientConfig {
            url: url.to_owned(),
        }
    }

    #[test]
    fn hub_url_from_http_base() {
        assert_eq!(
            client("http://127.0.0.1:7241/").hub_url().unwrap(),
            "ws://127.0.0.1:7241/auctionhub"
        );
    }

    #[test]
    fn hub_url_from_https_base() {
        assert_eq!(
            client("https://example.com").hub_url().unwrap(),
            "wss://example.com/auctionhub"
        );
    }

    #[test]
    fn hub_url_rejects_other_schemes() {
        assert!(client("ftp://example.com").hub_url().is_err());
    }

    #[test]
    fn parses_serve_defaults() {
        let opts = Opts::try_parse_from(["auction-hub", "serve"]).unwrap();
        match opts.command {
            Command::Serve(config) => assert_eq!(config.listen.port(), 7241),
            Command::Client(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_client_url() {
        let opts =
            Opts::try_parse_from(["auction-hub", "client", "--url", "http://10.0.0.1:80"]).unwrap();
        match opts.command {
            Command::Client(config) => assert_eq!(config.base_url(), "http://10.0.0.1:80"),
            Command::Serve(_) => panic!("expected client"),
        }
    }
}
