//! OS signal handling.
//!
//! # Responsibilities
//! - SIGTERM/SIGINT (Ctrl+C) → graceful shutdown
//! - SIGHUP → rebuild the edge range table from its source
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP reloads ranges only; it never shuts down

use std::sync::Arc;

use crate::lifecycle::Shutdown;
use crate::ranges::EdgeRanges;

/// Handle signals until shutdown is triggered.
pub async fn listen(shutdown: Shutdown, ranges: Arc<EdgeRanges>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut term, mut hup) = match (signal(SignalKind::terminate()), signal(SignalKind::hangup())) {
            (Ok(term), Ok(hup)) => (term, hup),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "Failed to install signal handlers, falling back to Ctrl+C only");
                ctrl_c(&shutdown).await;
                return;
            }
        };

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("SIGINT received");
                    break;
                }
                _ = term.recv() => {
                    tracing::info!("SIGTERM received");
                    break;
                }
                _ = hup.recv() => {
                    tracing::info!("SIGHUP received, reloading edge ranges");
                    if let Err(e) = ranges.clone().spawn_reload().await {
                        tracing::error!(error = %e, "Edge range reload task failed");
                    }
                }
                _ = shutdown.wait() => return,
            }
        }
        shutdown.trigger();
    }

    #[cfg(not(unix))]
    {
        let _ = ranges;
        ctrl_c(&shutdown).await;
    }
}

async fn ctrl_c(shutdown: &Shutdown) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
        _ = shutdown.wait() => {}
    }
}
