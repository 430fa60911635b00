//! Access decisions.
//!
//! Combines the edge-origin check and the allow-list check for one
//! resolved client. Pure: no I/O, no shared state.

use std::net::IpAddr;

use thiserror::Error;

use crate::http::request::ResolvedIdentity;
use crate::ranges::RangeTable;
use crate::security::policy::AccessPolicy;

/// Why a request was refused. The message is what clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("Access denied: request must originate from the trusted edge network")]
    EdgeOriginRequired,

    #[error("Access denied: IP not whitelisted")]
    NotWhitelisted,
}

impl DenyReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::EdgeOriginRequired => "edge_origin_required",
            DenyReason::NotWhitelisted => "not_whitelisted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(reason) => Some(*reason),
        }
    }
}

/// Decides whether a resolved client may proceed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDecider;

impl AccessDecider {
    /// Edge check first (when `edge_only`), then the allow-list (when one is
    /// configured). Both must pass. An unparsable client address fails
    /// whichever check it reaches.
    pub fn decide(&self, identity: &ResolvedIdentity, policy: &AccessPolicy, edge_table: &RangeTable) -> Verdict {
        let ip = identity.client_ip.parse::<IpAddr>().ok();

        if policy.edge_only_enabled() {
            let header_admits = policy.trusts_edge_header() && identity.edge_header_present;
            let in_edge_range = ip.is_some_and(|ip| edge_table.contains_addr(ip));
            if !header_admits && !in_edge_range {
                return Verdict::Deny(DenyReason::EdgeOriginRequired);
            }
        }

        if policy.has_allow_list() && !ip.is_some_and(|ip| policy.allows_addr(ip)) {
            return Verdict::Deny(DenyReason::NotWhitelisted);
        }

        Verdict::Allow
    }
}
