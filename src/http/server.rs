//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (access control, timeout, request ID, tracing)
//! - Bind server to listener
//! - Apply edge range updates while serving

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::http::middleware::{access_control_middleware, AccessGate};
use crate::http::request::ResolvedIdentity;
use crate::http::response;
use crate::ranges::{EdgeRanges, RangeSource, RangeTable};
use crate::security::AccessPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: AccessGate,
    pub admin_api_key: Arc<str>,
}

/// HTTP server fronted by the access gate.
pub struct GateServer {
    router: Router,
    config: GateConfig,
    state: AppState,
}

impl GateServer {
    /// Create a server, building the edge table from the configured source.
    pub fn new(config: GateConfig) -> Self {
        let ranges = Arc::new(EdgeRanges::init(RangeSource::from_config(&config.edge_ranges)));
        Self::with_ranges(config, ranges)
    }

    /// Create a server around an existing edge table holder.
    pub fn with_ranges(config: GateConfig, ranges: Arc<EdgeRanges>) -> Self {
        let policy = Arc::new(AccessPolicy::from_config(&config.access));
        let state = AppState {
            gate: AccessGate::new(policy, ranges),
            admin_api_key: Arc::from(config.admin.api_key.as_str()),
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `/health` is not guarded; every other path goes through the gate.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        let guarded = Router::new()
            .route("/whoami", get(whoami))
            .route("/", any(fallback))
            .route("/{*path}", any(fallback))
            .layer(middleware::from_fn_with_state(state.gate.clone(), access_control_middleware));

        Router::new()
            .route("/health", get(health))
            .merge(guarded)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Tables received on `range_updates` replace the live edge table.
    pub async fn run(
        self,
        listener: TcpListener,
        mut range_updates: mpsc::UnboundedReceiver<RangeTable>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let summary = self.state.gate.policy.summary();
        tracing::info!(
            address = %addr,
            edge_only = summary.edge_only,
            allow_list = summary.allow_list_configured,
            edge_prefixes = self.state.gate.ranges.current().len(),
            "HTTP server starting"
        );

        let ranges = self.state.gate.ranges.clone();
        tokio::spawn(async move {
            while let Some(table) = range_updates.recv().await {
                ranges.replace(table);
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn app_state(&self) -> AppState {
        self.state.clone()
    }

    pub fn ranges(&self) -> Arc<EdgeRanges> {
        self.state.gate.ranges.clone()
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Echo the caller's resolved identity.
async fn whoami(identity: ResolvedIdentity) -> Json<ResolvedIdentity> {
    Json(identity)
}

async fn fallback() -> axum::response::Response {
    response::not_found()
}
