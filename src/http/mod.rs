//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware/access_control.rs
//!         → request.rs (resolve client identity)
//!         → security (decide)
//!         → response.rs (403 payload on deny)
//!     → handler (identity available as an extractor)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ClientIpResolver, ResolvedIdentity};
pub use server::{AppState, GateServer};
