//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Access policy.
    pub access: AccessConfig,

    /// Where the edge network ranges come from.
    pub edge_ranges: EdgeRangesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Access policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Only admit requests from the edge network.
    pub edge_only: bool,

    /// Let the edge identification header (`CF-Connecting-IP`) satisfy the
    /// edge-only check on its own. The header is not authenticated.
    pub trust_edge_header: bool,

    /// Exact client addresses to admit.
    pub allowed_ips: Vec<String>,

    /// Client ranges to admit (CIDR notation).
    pub allowed_cidrs: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            edge_only: false,
            trust_edge_header: true,
            allowed_ips: Vec::new(),
            allowed_cidrs: Vec::new(),
        }
    }
}

impl AccessConfig {
    /// True when the unauthenticated edge header alone can satisfy the
    /// edge-only check.
    pub fn header_bypass_active(&self) -> bool {
        self.edge_only && self.trust_edge_header
    }
}

/// Edge range source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeRangesConfig {
    /// JSON range document (`{"ipv4": [...], "ipv6": [...]}`). The built-in
    /// Cloudflare list is used when unset or unusable.
    pub file: Option<PathBuf>,

    /// Reload the document when it changes on disk.
    pub watch: bool,
}

impl Default for EdgeRangesConfig {
    fn default() -> Self {
        Self {
            file: None,
            watch: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (pretty, json).
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

/// Placeholder key; validation rejects it when the admin API is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
