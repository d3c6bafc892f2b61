mod auction;
mod client;
mod config;
mod console;
mod event;
mod hub;
mod server;
mod service;
mod store;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = config::Opts::parse();
    let svc_ctl = service::ServiceControl::new();

    ctrlc::set_handler({
        let svc_ctl = svc_ctl.clone();
        move || {
            eprintln!("Stopping all services...");
            svc_ctl.stop_all();
        }
    })?;

    let runtime = tokio::runtime::Runtime::new()?;
    let res = runtime.block_on(async move {
        match opts.command {
            config::Command::Serve(config) => run_server(config, svc_ctl).await,
            config::Command::Client(config) => run_client(config, svc_ctl).await,
        }
    });
    // a pending stdin read would otherwise keep the runtime alive
    runtime.shutdown_background();
    res
}

async fn run_server(config: config::ServerConfig, svc_ctl: service::ServiceControl) -> Result<()> {
    let store: store::SharedAuctionStore = Arc::new(store::InMemoryAuctionStore::seeded());
    let hub = hub::NotificationHub::new_shared(store.clone());

    let (_local_addr, handle) =
        server::bind(config.listen, server::AppState { store, hub }, &svc_ctl).await?;
    handle.join().await
}

async fn run_client(config: config::ClientConfig, svc_ctl: service::ServiceControl) -> Result<()> {
    let directory = client::HttpAuctionDirectory::new_shared(config.base_url());
    let cache = client::initialize(&*directory).await?;
    console::print_auctions(&cache.snapshot());

    let session = client::ClientSession::connect(
        &config.hub_url()?,
        cache,
        Arc::new(console::ConsoleObserver),
    )
    .await?;

    console::run_session(session, BufReader::new(tokio::io::stdin()), &svc_ctl).await
}
