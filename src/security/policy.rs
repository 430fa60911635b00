//! Access policy: allow-list entries and edge-origin requirements.

use std::collections::HashSet;
use std::net::IpAddr;

use serde::Serialize;

use crate::config::schema::AccessConfig;
use crate::ranges::{RangeOrigin, RangeTable};

/// Immutable access policy, built once before serving traffic.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    allowed_exact_ips: HashSet<IpAddr>,
    allowed_cidrs: RangeTable,
    allow_list_configured: bool,
    edge_only: bool,
    trust_edge_header: bool,
}

/// Non-secret view of a policy for logs and the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    pub edge_only: bool,
    pub trust_edge_header: bool,
    pub allow_list_configured: bool,
    pub allowed_exact_ips: usize,
    pub allowed_cidrs: usize,
}

impl AccessPolicy {
    /// Admits everything.
    pub fn open() -> Self {
        Self {
            allowed_exact_ips: HashSet::new(),
            allowed_cidrs: RangeTable::from_literals(RangeOrigin::Inline, std::iter::empty::<&str>()),
            allow_list_configured: false,
            edge_only: false,
            trust_edge_header: false,
        }
    }

    /// Stand-alone edge-only policy. The edge header alone admits a request.
    pub fn edge_only() -> Self {
        Self {
            edge_only: true,
            trust_edge_header: true,
            ..Self::open()
        }
    }

    /// Explicit allow-list, optionally also requiring an edge-network source
    /// address. The edge check here is a pure range test.
    ///
    /// Blank entries are ignored; malformed ones are logged and skipped. A
    /// list made only of malformed entries still counts as configured and
    /// admits nobody.
    pub fn allow_list<I, S, J, T>(exact_ips: I, cidrs: J, edge_only: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        J: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut configured = false;
        let mut allowed_exact_ips = HashSet::new();
        for entry in exact_ips {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            configured = true;
            match entry.parse::<IpAddr>() {
                Ok(ip) => {
                    allowed_exact_ips.insert(ip.to_canonical());
                }
                Err(e) => tracing::warn!(entry = %entry, error = %e, "Skipping malformed allow-list IP"),
            }
        }

        let cidrs: Vec<T> = cidrs.into_iter().collect();
        configured |= cidrs.iter().any(|c| !c.as_ref().trim().is_empty());
        let allowed_cidrs = RangeTable::from_literals(RangeOrigin::Inline, cidrs);

        Self {
            allowed_exact_ips,
            allowed_cidrs,
            allow_list_configured: configured,
            edge_only,
            trust_edge_header: false,
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::allow_list(&config.allowed_ips, &config.allowed_cidrs, config.edge_only)
            .with_trust_edge_header(config.trust_edge_header)
    }

    /// Whether the edge identification header alone satisfies the edge check.
    ///
    /// The header is not authenticated. Any client that reaches the service
    /// directly can set it.
    pub fn with_trust_edge_header(mut self, trust: bool) -> Self {
        self.trust_edge_header = trust;
        self
    }

    pub fn edge_only_enabled(&self) -> bool {
        self.edge_only
    }

    pub fn trusts_edge_header(&self) -> bool {
        self.trust_edge_header
    }

    pub fn has_allow_list(&self) -> bool {
        self.allow_list_configured
    }

    /// Allow-list membership: exact match or CIDR containment.
    pub fn allows_addr(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.allowed_exact_ips.contains(&ip) || self.allowed_cidrs.contains_addr(ip)
    }

    /// Allow-list membership for an address literal. Unparsable input is
    /// never allowed.
    pub fn is_ip_allowed(&self, ip: &str) -> bool {
        ip.parse::<IpAddr>().is_ok_and(|ip| self.allows_addr(ip))
    }

    pub fn summary(&self) -> PolicySummary {
        PolicySummary {
            edge_only: self.edge_only,
            trust_edge_header: self.trust_edge_header,
            allow_list_configured: self.allow_list_configured,
            allowed_exact_ips: self.allowed_exact_ips.len(),
            allowed_cidrs: self.allowed_cidrs.len(),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_exact_ip() {
        let policy = AccessPolicy::allow_list(["10.0.0.5"], NONE, false);
        assert!(policy.is_ip_allowed("10.0.0.5"));
        assert!(!policy.is_ip_allowed("10.0.0.6"));
    }

    #[test]
    fn test_cidr() {
        let policy = AccessPolicy::allow_list(NONE, ["10.0.1.0/24"], false);
        assert!(policy.is_ip_allowed("10.0.1.9"));
        assert!(!policy.is_ip_allowed("10.0.2.9"));
    }

    #[test]
    fn test_ipv4_mapped_matches_exact_entry() {
        let policy = AccessPolicy::allow_list(["10.0.0.5"], NONE, false);
        assert!(policy.is_ip_allowed("::ffff:10.0.0.5"));
    }

    #[test]
    fn test_blank_entries_do_not_configure_a_list() {
        let policy = AccessPolicy::allow_list(["", "  "], [""], false);
        assert!(!policy.has_allow_list());
    }

    #[test]
    fn test_malformed_only_list_admits_nobody() {
        let policy = AccessPolicy::allow_list(["not-an-ip"], ["not-a-cidr"], false);
        assert!(policy.has_allow_list());
        assert!(!policy.is_ip_allowed("10.0.0.1"));
        assert_eq!(policy.summary().allowed_exact_ips, 0);
        assert_eq!(policy.summary().allowed_cidrs, 0);
    }

    #[test]
    fn test_malformed_entry_keeps_the_rest() {
        let policy = AccessPolicy::allow_list(["bogus", "10.0.0.5"], ["10.0.1.0/24", "10.0.2.0/99"], false);
        assert!(policy.is_ip_allowed("10.0.0.5"));
        assert!(policy.is_ip_allowed("10.0.1.200"));
        assert!(!policy.is_ip_allowed("10.0.2.1"));
    }

    #[test]
    fn test_variants() {
        let edge = AccessPolicy::edge_only();
        assert!(edge.edge_only_enabled() && edge.trusts_edge_header() && !edge.has_allow_list());

        let list = AccessPolicy::allow_list(["10.0.0.5"], NONE, true);
        assert!(list.edge_only_enabled() && !list.trusts_edge_header() && list.has_allow_list());

        let open = AccessPolicy::default();
        assert!(!open.edge_only_enabled() && !open.has_allow_list());
    }

    #[test]
    fn test_from_config() {
        let config = AccessConfig {
            edge_only: true,
            trust_edge_header: false,
            allowed_ips: vec!["10.0.0.5".into()],
            allowed_cidrs: vec!["10.0.1.0/24".into()],
        };
        let policy = AccessPolicy::from_config(&config);
        assert_eq!(
            policy.summary(),
            PolicySummary {
                edge_only: true,
                trust_edge_header: false,
                allow_list_configured: true,
                allowed_exact_ips: 1,
                allowed_cidrs: 1,
            }
        );
    }
}
