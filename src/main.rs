//! edge-gate
//!
//! Fronts a service with trusted-proxy client IP resolution and CIDR access
//! control.
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ request id → trace → timeout               │
//!                              │        │                                     │
//!                              │        ▼                                     │
//!                              │   access gate ── resolve ── decide ──▶ 403   │
//!                              │        │              ▲                      │
//!                              │        ▼              │                      │
//!                              │     handler      EdgeRanges ◀── watcher /    │
//!                              │                  (ArcSwap)      SIGHUP /     │
//!                              │                                 admin reload │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_gate::admin::setup_admin_router;
use edge_gate::config::loader::{default_config, load_config};
use edge_gate::config::watcher::RangeWatcher;
use edge_gate::http::GateServer;
use edge_gate::lifecycle::{signals, Shutdown};
use edge_gate::observability::{logging, metrics};
use edge_gate::ranges::{EdgeRanges, RangeSource};

#[derive(Parser)]
#[command(name = "edge-gate")]
#[command(about = "Trusted-proxy IP resolution and CIDR access control", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability);
    tracing::info!("edge-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        ranges_file = ?config.edge_ranges.file,
        "Configuration loaded"
    );

    if config.access.header_bypass_active() {
        tracing::warn!(
            "access.trust_edge_header is enabled: any request carrying CF-Connecting-IP passes the edge-only check \
             without a source address check. Disable it unless the header is verified upstream."
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Edge table is built once here and injected everywhere.
    let ranges = Arc::new(EdgeRanges::init(RangeSource::from_config(&config.edge_ranges)));
    let current = ranges.current();
    tracing::info!(origin = current.origin().label(), prefixes = current.len(), "Edge ranges ready");
    drop(current);

    let (range_updates, _watcher) = match (&config.edge_ranges.file, config.edge_ranges.watch) {
        (Some(path), true) => {
            let (watcher, updates) = RangeWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (updates, Some(handle)),
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to watch edge range file");
                    (mpsc::unbounded_channel().1, None)
                }
            }
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let shutdown = Shutdown::new();
    tokio::spawn(signals::listen(shutdown.clone(), ranges.clone()));

    let server = GateServer::with_ranges(config.clone(), ranges);

    if config.admin.enabled {
        let admin = setup_admin_router(server.app_state());
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
        let admin_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let serve = axum::serve(admin_listener, admin).with_graceful_shutdown(async move { admin_shutdown.wait().await });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener, range_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
