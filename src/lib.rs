//! Trusted-proxy client IP resolution and CIDR access control.
//!
//! Every request is resolved to a client address (edge header, forwarded
//! chain, real-IP header, transport peer) and checked against an
//! edge-network range table and an optional allow-list.

// Core
pub mod ranges;
pub mod security;

// HTTP surface
pub mod admin;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use http::{ClientIpResolver, GateServer, ResolvedIdentity};
pub use lifecycle::Shutdown;
pub use ranges::{EdgeRanges, NetworkPrefix, RangeTable};
pub use security::{AccessDecider, AccessPolicy, DenyReason, Verdict};
