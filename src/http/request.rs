//! Client identity resolution.
//!
//! # Responsibilities
//! - Pick the best client address from proxy headers
//! - Collect edge network metadata (country, trace id)
//! - Expose the identity to handlers as an extractor
//!
//! # Design Decisions
//! - Fixed precedence, first non-empty value wins, no merging
//! - Headers other than the transport peer are forgeable; enforcement
//!   happens in the access decider, not here
//! - Values are returned as strings and parsed by the decider, so a
//!   garbage header ends in a deny rather than a fallback

use std::net::{IpAddr, SocketAddr};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use serde::Serialize;

use crate::ranges::RangeTable;

/// Original client IP as set by Cloudflare.
pub const CF_CONNECTING_IP: HeaderName = HeaderName::from_static("cf-connecting-ip");
/// Two-letter country code of the client, set by Cloudflare.
pub const CF_IPCOUNTRY: HeaderName = HeaderName::from_static("cf-ipcountry");
/// Cloudflare's per-request trace id.
pub const CF_RAY: HeaderName = HeaderName::from_static("cf-ray");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Per-request client identity, attached to request extensions once the
/// request is admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub client_ip: String,
    pub edge_header_present: bool,
    pub edge_country: Option<String>,
    pub edge_request_id: Option<String>,
}

impl ResolvedIdentity {
    /// The client address, if it parses.
    pub fn addr(&self) -> Option<IpAddr> {
        self.client_ip.parse().ok()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ResolvedIdentity {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedIdentity>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Client identity not resolved"))
    }
}

/// Deduces the client address of a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpResolver;

impl ClientIpResolver {
    /// Resolve the client address.
    ///
    /// Precedence: `CF-Connecting-IP`, left-most `X-Forwarded-For` hop,
    /// `X-Real-IP`, then the transport peer. Returns an empty string when
    /// nothing is known.
    pub fn resolve(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if let Some(ip) = header_str(headers, &CF_CONNECTING_IP) {
            return ip.to_string();
        }

        if let Some(xff) = header_str(headers, &X_FORWARDED_FOR) {
            return xff.split(',').next().unwrap_or_default().trim().to_string();
        }

        if let Some(ip) = header_str(headers, &X_REAL_IP) {
            return ip.to_string();
        }

        peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
    }

    /// Resolve the address and collect edge metadata.
    pub fn identify(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> ResolvedIdentity {
        ResolvedIdentity {
            client_ip: self.resolve(headers, peer),
            edge_header_present: header_str(headers, &CF_CONNECTING_IP).is_some(),
            edge_country: header_str(headers, &CF_IPCOUNTRY).map(str::to_string),
            edge_request_id: header_str(headers, &CF_RAY).map(str::to_string),
        }
    }
}

/// True if the request carries the edge header or resolves to an address
/// inside `table`.
pub fn verify_edge_request(headers: &HeaderMap, peer: Option<SocketAddr>, table: &RangeTable) -> bool {
    if header_str(headers, &CF_CONNECTING_IP).is_some() {
        return true;
    }
    table.contains(&ClientIpResolver.resolve(headers, peer))
}

/// Non-empty, visible-ASCII header value.
fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
