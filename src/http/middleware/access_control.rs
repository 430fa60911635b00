//! Access Control Middleware.
//! Resolves the client and enforces the access policy.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::http::request::{ClientIpResolver, ResolvedIdentity};
use crate::http::response;
use crate::observability::metrics;
use crate::ranges::EdgeRanges;
use crate::security::{AccessDecider, AccessPolicy, Verdict};

/// State required for access control.
#[derive(Clone)]
pub struct AccessGate {
    pub policy: Arc<AccessPolicy>,
    pub ranges: Arc<EdgeRanges>,
    resolver: ClientIpResolver,
    decider: AccessDecider,
}

impl AccessGate {
    pub fn new(policy: Arc<AccessPolicy>, ranges: Arc<EdgeRanges>) -> Self {
        Self {
            policy,
            ranges,
            resolver: ClientIpResolver,
            decider: AccessDecider,
        }
    }

    /// Resolve the client and decide against the current edge table.
    pub fn check(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> (ResolvedIdentity, Verdict) {
        let identity = self.resolver.identify(headers, peer);
        let verdict = self.decider.decide(&identity, &self.policy, &self.ranges.current());
        (identity, verdict)
    }
}

pub async fn access_control_middleware(
    State(gate): State<AccessGate>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (identity, verdict) = gate.check(req.headers(), peer);
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    match verdict {
        Verdict::Allow => {
            debug!(request_id = %request_id, client_ip = %identity.client_ip, edge = identity.edge_header_present, "Request admitted");
            metrics::record_decision("allow", "none");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Verdict::Deny(reason) => {
            warn!(
                request_id = %request_id,
                client_ip = %identity.client_ip,
                peer = ?peer,
                reason = reason.as_str(),
                "Request denied"
            );
            metrics::record_decision("deny", reason.as_str());
            response::forbidden(reason)
        }
    }
}
