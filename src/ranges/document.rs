//! External range document.
//!
//! Operators can replace the built-in Cloudflare list with a JSON file of
//! the same shape Cloudflare publishes:
//!
//! ```json
//! { "ipv4": ["173.245.48.0/20"], "ipv6": ["2400:cb00::/32"] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ranges::table::RangeError;

/// CIDR literals grouped by address family.
///
/// Entries are kept as strings so a malformed literal can be skipped at
/// table build time instead of failing the whole document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RangeDocument {
    #[serde(default)]
    pub ipv4: Vec<String>,
    #[serde(default)]
    pub ipv6: Vec<String>,
}

impl RangeDocument {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> Result<Self, RangeError> {
        let content = fs::read_to_string(path).map_err(|source| RangeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| RangeError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All literals, IPv4 first.
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.ipv4.iter().chain(self.ipv6.iter()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
