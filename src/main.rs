//! OpenAPI-rewriting API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request   ┌──────────┐    ┌──────────┐    ┌──────────────┐
//!     ────────────────▶│  http    │───▶│ routing  │───▶│load_balancer │
//!                      │  server  │    │  table   │    │ round robin  │
//!                      └──────────┘    └──────────┘    └──────┬───────┘
//!                                                             │
//!                                                             ▼
//!     Client Response  ┌──────────────────────────┐    ┌──────────────┐
//!     ◀────────────────│ filter chain             │◀───│ service      │
//!                      │  -1 modify servers       │    │ instance     │
//!                      │   0 hop-by-hop headers   │    └──────────────┘
//!                      └──────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use openapi_gateway::config::loader::load_config;
use openapi_gateway::config::watcher::ConfigWatcher;
use openapi_gateway::config::GatewayConfig;
use openapi_gateway::lifecycle::signals::shutdown_signal;
use openapi_gateway::observability::{logging, metrics};
use openapi_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "openapi-gateway")]
#[command(about = "API gateway that rewrites OpenAPI server entries of downstream services", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "openapi-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        backends = config.backends.len(),
        openapi_rewrite = config.openapi.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    HttpServer::new(config).run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
