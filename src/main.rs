use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wshub::server::config::DEFAULT_GROUP;
use wshub::{HubServer, ServerConfig};

#[derive(Parser)]
#[command(name = "wshub")]
#[command(about = "Counter hub: broadcasts a shared counter to grouped WebSocket clients")]
struct Args {
    /// HTTP service address
    #[arg(long, default_value = "localhost:8910")]
    addr: String,

    /// Use JSON logs
    #[arg(long)]
    json: bool,

    /// Group for clients that don't pass ?group=
    #[arg(long, default_value = DEFAULT_GROUP)]
    group: String,

    /// Counter increment interval in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Per-client broadcast deadline in milliseconds
    #[arg(long, default_value_t = 5000)]
    send_timeout_ms: u64,

    /// Maximum concurrent connections (0 for unlimited)
    #[arg(long, default_value_t = 0)]
    max_connections: usize,
}

fn setup_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,wshub=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn resolve(addr: &str) -> wshub::Result<SocketAddr> {
    tokio::net::lookup_host(addr)
        .await?
        .next()
        .ok_or_else(|| wshub::Error::InvalidAddr(addr.to_owned()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.json);

    let bind_addr = resolve(&args.addr)
        .await
        .with_context(|| format!("Unable to resolve {}", args.addr))?;

    let config = ServerConfig::with_addr(bind_addr)
        .default_group(args.group)
        .tick_interval(Duration::from_millis(args.tick_ms))
        .send_timeout(Duration::from_millis(args.send_timeout_ms))
        .max_connections(args.max_connections);

    tracing::info!(url = %format!("http://{}", args.addr), "Starting counter hub");

    HubServer::new(config)
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Unable to setup listener")?;

    Ok(())
}
