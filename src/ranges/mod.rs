//! Edge network range tables.
//!
//! # Data Flow
//! ```text
//! built-in literals / range document (JSON)
//!     → document.rs (deserialize {"ipv4": [...], "ipv6": [...]})
//!     → table.rs (parse literals, skip malformed, mask host bits)
//!     → RangeTable (immutable)
//!     → shared.rs (EdgeRanges, swapped wholesale on reload)
//! ```
//!
//! # Design Decisions
//! - A malformed literal is skipped, never fatal
//! - An unreadable or empty document falls back to the built-in list
//! - Tables are never mutated; a reload builds a new one and swaps it in
//! - Lookups are a linear scan: tables hold tens of prefixes

pub mod builtin;
pub mod document;
pub mod prefix;
pub mod shared;
pub mod table;

pub use builtin::builtin_table;
pub use document::RangeDocument;
pub use prefix::{AddressFamily, NetworkPrefix};
pub use shared::EdgeRanges;
pub use table::{RangeError, RangeOrigin, RangeSource, RangeTable};
