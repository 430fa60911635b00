//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::response::Response;
use serde_json::Value;
use tokio::sync::mpsc;

use edge_gate::config::GateConfig;
use edge_gate::ranges::{EdgeRanges, RangeSource, RangeTable};
use edge_gate::{GateServer, Shutdown};

/// Build a request as it would arrive from `peer`.
pub fn request(uri: &str, peer: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    for (name, value) in headers {
        req.headers_mut().insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    req.extensions_mut()
        .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
    req
}

pub async fn body_json(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Write a JSON range document into a temporary file.
pub fn write_ranges(ipv4: &[&str], ipv6: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let doc = serde_json::json!({ "ipv4": ipv4, "ipv6": ipv6 });
    file.write_all(doc.to_string().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Server whose edge table is exactly `table`.
pub fn server_with_table(config: GateConfig, table: RangeTable) -> GateServer {
    let ranges = Arc::new(EdgeRanges::with_table(RangeSource::Builtin, table));
    GateServer::with_ranges(config, ranges)
}

/// A gate running on an ephemeral port.
pub struct RunningGate {
    pub addr: SocketAddr,
    pub ranges: Arc<EdgeRanges>,
    pub updates: mpsc::UnboundedSender<RangeTable>,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

pub async fn spawn_gate(server: GateServer) -> RunningGate {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let ranges = server.ranges();
    let shutdown = Shutdown::new();
    let (updates, range_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, range_updates, server_shutdown).await });

    tokio::time::sleep(Duration::from_millis(100)).await;

    RunningGate {
        addr,
        ranges,
        updates,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
