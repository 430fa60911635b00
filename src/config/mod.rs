//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLOUDFLARE_IPS_FILE
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → AccessPolicy / EdgeRanges built once at start-up
//!
//! On range document change:
//!     watcher.rs detects change
//!     → RangeTable rebuilt (built-in fallback)
//!     → atomic swap inside EdgeRanges
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the edge table reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AccessConfig, AdminConfig, EdgeRangesConfig, GateConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig};
