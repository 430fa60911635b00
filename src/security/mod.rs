//! Access control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → http::request (resolve client identity)
//!     → access_control.rs (edge-origin check, then allow-list check)
//!     → Verdict
//!     → http::middleware (continue, or 403 with error payload)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unparsable client address is denied, never a 5xx
//! - Malformed and blocked addresses get the same response
//! - Policy and tables are immutable; decisions take no locks

pub mod access_control;
pub mod policy;

pub use access_control::{AccessDecider, DenyReason, Verdict};
pub use policy::{AccessPolicy, PolicySummary};
