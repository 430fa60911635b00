//! Immutable range tables and their construction.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::EdgeRangesConfig;
use crate::ranges::builtin::{self, builtin_table};
use crate::ranges::document::RangeDocument;
use crate::ranges::prefix::NetworkPrefix;

/// Errors from reading an external range document.
#[derive(Debug, Error)]
pub enum RangeError {
    #[error("failed to read range file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse range file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("range file {} contains no valid prefixes", .0.display())]
    Empty(PathBuf),
}

/// Where a table's prefixes came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum RangeOrigin {
    /// The compiled-in Cloudflare list.
    Builtin,
    /// An operator-supplied range document.
    File(PathBuf),
    /// Literals handed over in code or configuration (allow-lists).
    Inline,
}

impl RangeOrigin {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RangeOrigin::Builtin => "builtin",
            RangeOrigin::File(_) => "file",
            RangeOrigin::Inline => "inline",
        }
    }
}

/// What a table is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSource {
    Builtin,
    /// A range document, with fallback to the built-in list.
    File(PathBuf),
}

impl RangeSource {
    pub fn from_config(config: &EdgeRangesConfig) -> Self {
        match &config.file {
            Some(path) => RangeSource::File(path.clone()),
            None => RangeSource::Builtin,
        }
    }
}

/// A read-only set of network prefixes.
#[derive(Debug, Clone)]
pub struct RangeTable {
    origin: RangeOrigin,
    prefixes: Vec<NetworkPrefix>,
}

impl RangeTable {
    /// Build a table from CIDR literals.
    ///
    /// Blank literals are ignored. Malformed ones are logged and skipped.
    pub fn from_literals<I, S>(origin: RangeOrigin, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes = Vec::new();
        for literal in literals {
            let literal = literal.as_ref().trim();
            if literal.is_empty() {
                continue;
            }
            match literal.parse::<NetworkPrefix>() {
                Ok(prefix) => prefixes.push(prefix),
                Err(e) => {
                    tracing::warn!(literal = %literal, origin = origin.label(), error = %e, "Skipping malformed CIDR literal");
                }
            }
        }
        Self { origin, prefixes }
    }

    /// A freshly parsed copy of the built-in Cloudflare list.
    ///
    /// Most callers want [`builtin_table`], which parses the list once.
    pub fn builtin() -> Self {
        Self::from_literals(RangeOrigin::Builtin, builtin::literals())
    }

    pub fn from_document(path: &Path, document: &RangeDocument) -> Self {
        Self::from_literals(RangeOrigin::File(path.to_path_buf()), document.literals())
    }

    /// Build from a range document, failing if it is unreadable or yields
    /// no usable prefixes.
    pub fn try_from_file(path: &Path) -> Result<Self, RangeError> {
        let document = RangeDocument::from_path(path)?;
        let table = Self::from_document(path, &document);
        if table.is_empty() {
            return Err(RangeError::Empty(path.to_path_buf()));
        }
        Ok(table)
    }

    /// Build from `source`. Never returns an empty edge table: a failing
    /// file source falls back to the built-in list.
    pub fn load(source: &RangeSource) -> Self {
        match source {
            RangeSource::Builtin => builtin_table().clone(),
            RangeSource::File(path) => match Self::try_from_file(path) {
                Ok(table) => {
                    tracing::info!(path = %path.display(), prefixes = table.len(), "Loaded edge ranges from file");
                    table
                }
                Err(e) => {
                    tracing::warn!(error = %e, cause = ?std::error::Error::source(&e), "Falling back to built-in edge ranges");
                    builtin_table().clone()
                }
            },
        }
    }

    /// Membership test for an address literal.
    ///
    /// A candidate that does not parse as an IP address is never contained.
    pub fn contains(&self, ip: &str) -> bool {
        match ip.parse::<IpAddr>() {
            Ok(addr) => self.contains_addr(addr),
            Err(_) => false,
        }
    }

    /// Membership test for a parsed address. IPv4-mapped IPv6 addresses are
    /// tested as IPv4.
    pub fn contains_addr(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.prefixes.iter().any(|prefix| prefix.contains(&ip))
    }

    pub fn origin(&self) -> &RangeOrigin {
        &self.origin
    }

    pub fn prefixes(&self) -> &[NetworkPrefix] {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{Ipv4Addr, Ipv6Addr};

    /// Addresses inside `prefix` built from several host-bit patterns.
    fn host_bit_variants(prefix: &NetworkPrefix) -> Vec<IpAddr> {
        match (prefix.base(), prefix.last()) {
            (IpAddr::V4(base), IpAddr::V4(last)) => {
                let base = u32::from(base);
                let host_mask = u32::from(last) ^ base;
                let mut out = vec![base, base | host_mask, base | (host_mask & 0x5555_5555), base | (host_mask & 0xaaaa_aaaa)];
                for bit in 0..32 {
                    if host_mask & (1 << bit) != 0 {
                        out.push(base | (1 << bit));
                    }
                }
                out.into_iter().map(|a| IpAddr::V4(Ipv4Addr::from(a))).collect()
            }
            (IpAddr::V6(base), IpAddr::V6(last)) => {
                let base = u128::from(base);
                let host_mask = u128::from(last) ^ base;
                let pattern = 0x5555_5555_5555_5555_5555_5555_5555_5555u128;
                let mut out = vec![base, base | host_mask, base | (host_mask & pattern), base | (host_mask & !pattern)];
                for bit in 0..128 {
                    if host_mask & (1u128 << bit) != 0 {
                        out.push(base | (1u128 << bit));
                    }
                }
                out.into_iter().map(|a| IpAddr::V6(Ipv6Addr::from(a))).collect()
            }
            _ => unreachable!("prefix bounds share a family"),
        }
    }

    fn neighbours(prefix: &NetworkPrefix) -> Vec<IpAddr> {
        let mut out = Vec::new();
        match (prefix.base(), prefix.last()) {
            (IpAddr::V4(base), IpAddr::V4(last)) => {
                if let Some(below) = u32::from(base).checked_sub(1) {
                    out.push(IpAddr::V4(Ipv4Addr::from(below)));
                }
                if let Some(above) = u32::from(last).checked_add(1) {
                    out.push(IpAddr::V4(Ipv4Addr::from(above)));
                }
            }
            (IpAddr::V6(base), IpAddr::V6(last)) => {
                if let Some(below) = u128::from(base).checked_sub(1) {
                    out.push(IpAddr::V6(Ipv6Addr::from(below)));
                }
                if let Some(above) = u128::from(last).checked_add(1) {
                    out.push(IpAddr::V6(Ipv6Addr::from(above)));
                }
            }
            _ => unreachable!("prefix bounds share a family"),
        }
        out
    }

    #[test]
    fn test_builtin_ranges_cover_host_bits() {
        let table = RangeTable::builtin();
        for prefix in table.prefixes() {
            for ip in host_bit_variants(prefix) {
                assert!(table.contains_addr(ip), "{} should contain {}", prefix, ip);
                assert!(table.contains(&ip.to_string()));
            }
        }
    }

    #[test]
    fn test_builtin_ranges_exclude_neighbours() {
        for prefix in RangeTable::builtin().prefixes() {
            let single = RangeTable::from_literals(RangeOrigin::Inline, [prefix.to_string()]);
            for ip in neighbours(prefix) {
                assert!(!single.contains_addr(ip), "{} should not contain {}", prefix, ip);
            }
        }
    }

    #[test]
    fn test_builtin_table_has_both_families() {
        let table = RangeTable::builtin();
        assert_eq!(table.len(), builtin::IPV4.len() + builtin::IPV6.len());
        assert!(table.contains("173.245.48.1"));
        assert!(table.contains("2606:4700::6810:85e5"));
        assert!(!table.contains("8.8.8.8"));
        assert!(!table.contains("2001:db8::1"));
    }

    #[test]
    fn test_order_independent() {
        let forward: Vec<&str> = builtin::literals().collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let mut rotated = forward.clone();
        rotated.rotate_left(7);

        let a = RangeTable::from_literals(RangeOrigin::Inline, &forward);
        let b = RangeTable::from_literals(RangeOrigin::Inline, &reversed);
        let c = RangeTable::from_literals(RangeOrigin::Inline, &rotated);

        let probes = ["104.16.0.1", "104.24.255.255", "1.1.1.1", "172.71.255.255", "172.72.0.0", "2a06:98c7::1", "2a06:98c8::1", "::ffff:162.158.1.1", "garbage"];
        for probe in probes {
            let expected = a.contains(probe);
            assert_eq!(b.contains(probe), expected, "{}", probe);
            assert_eq!(c.contains(probe), expected, "{}", probe);
            assert_eq!(a.contains(probe), expected, "repeat lookup of {}", probe);
        }
    }

    #[test]
    fn test_builtin_built_twice_agrees() {
        let first = RangeTable::builtin();
        let second = RangeTable::builtin();
        for probe in ["131.0.72.5", "131.0.76.0", "197.234.243.255", "2c0f:f248::1", "2c0f:f249::", "10.0.0.1"] {
            assert_eq!(first.contains(probe), second.contains(probe), "{}", probe);
        }
    }

    #[test]
    fn test_malformed_literals_skipped() {
        let table = RangeTable::from_literals(RangeOrigin::Inline, ["10.0.0.0/8", "not-a-cidr", "", "  ", "192.168.1.0/24"]);
        assert_eq!(table.len(), 2);
        assert!(table.contains("10.200.0.1"));
        assert!(table.contains("192.168.1.77"));
    }

    #[test]
    fn test_unparsable_candidate_is_not_contained() {
        let table = RangeTable::from_literals(RangeOrigin::Inline, ["0.0.0.0/0", "::/0"]);
        assert!(!table.contains(""));
        assert!(!table.contains("unknown"));
        assert!(!table.contains("10.0.0.1:443"));
        assert!(!table.contains(" 10.0.0.1"));
    }

    #[test]
    fn test_ipv4_mapped_candidate() {
        let table = RangeTable::from_literals(RangeOrigin::Inline, ["162.158.0.0/15"]);
        assert!(table.contains("::ffff:162.158.4.4"));
    }

    #[test]
    fn test_file_with_malformed_entry_keeps_valid_ones() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ipv4": ["198.51.100.0/24", "not-a-cidr"], "ipv6": ["2001:db8::/32"]}}"#).unwrap();

        let table = RangeTable::load(&RangeSource::File(file.path().to_path_buf()));
        assert_eq!(table.origin(), &RangeOrigin::File(file.path().to_path_buf()));
        assert_eq!(table.len(), 2);
        assert!(table.contains("198.51.100.42"));
        assert!(table.contains("2001:db8::1"));
        assert!(!table.contains("173.245.48.1"));
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let source = RangeSource::File(dir.path().join("absent.json"));

        assert!(matches!(RangeTable::try_from_file(&dir.path().join("absent.json")), Err(RangeError::Io { .. })));
        let table = RangeTable::load(&source);
        assert_eq!(table.origin(), &RangeOrigin::Builtin);
        assert!(table.contains("173.245.48.1"));
    }

    #[test]
    fn test_unparsable_file_falls_back_to_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ipv4 = [\"10.0.0.0/8\"]").unwrap();

        assert!(matches!(RangeTable::try_from_file(file.path()), Err(RangeError::Parse { .. })));
        let table = RangeTable::load(&RangeSource::File(file.path().to_path_buf()));
        assert_eq!(table.origin(), &RangeOrigin::Builtin);
    }

    #[test]
    fn test_empty_file_falls_back_to_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ipv4": ["bogus"], "ipv6": []}}"#).unwrap();

        assert!(matches!(RangeTable::try_from_file(file.path()), Err(RangeError::Empty(_))));
        let table = RangeTable::load(&RangeSource::File(file.path().to_path_buf()));
        assert_eq!(table.origin(), &RangeOrigin::Builtin);
        assert!(!table.is_empty());
    }
}
