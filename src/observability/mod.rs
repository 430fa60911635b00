//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Access decisions, range reloads, lifecycle events:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID attached to every access log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
