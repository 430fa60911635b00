//! Built-in edge network ranges.
//!
//! Cloudflare's published ranges (<https://www.cloudflare.com/ips/>). Used
//! when no range document is configured and whenever the configured one
//! cannot be used.

use std::sync::OnceLock;

use crate::ranges::table::RangeTable;

pub const IPV4: &[&str] = &[
    "173.245.48.0/20",
    "103.21.244.0/22",
    "103.22.200.0/22",
    "103.31.4.0/22",
    "141.101.64.0/18",
    "108.162.192.0/18",
    "190.93.240.0/20",
    "188.114.96.0/20",
    "197.234.240.0/22",
    "198.41.128.0/17",
    "162.158.0.0/15",
    "104.16.0.0/13",
    "104.24.0.0/14",
    "172.64.0.0/13",
    "131.0.72.0/22",
];

pub const IPV6: &[&str] = &[
    "2400:cb00::/32",
    "2606:4700::/32",
    "2803:f800::/32",
    "2405:b500::/32",
    "2405:8100::/32",
    "2a06:98c0::/29",
    "2c0f:f248::/32",
];

/// All built-in literals, IPv4 first.
pub fn literals() -> impl Iterator<Item = &'static str> {
    IPV4.iter().chain(IPV6.iter()).copied()
}

static BUILTIN: OnceLock<RangeTable> = OnceLock::new();

/// The built-in table, parsed on first use.
///
/// Concurrent first callers block on a single construction and all observe
/// the same table.
pub fn builtin_table() -> &'static RangeTable {
    BUILTIN.get_or_init(RangeTable::builtin)
}
