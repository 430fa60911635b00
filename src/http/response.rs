//! JSON error responses.
//!
//! Error bodies carry a numeric code built from the HTTP status, a service
//! code and a case code:
//!
//! ```text
//! 403 | 13 | 27  →  4031327
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::security::DenyReason;

/// Service codes (two digits).
pub const SERVICE_COMMON: u8 = 0;
pub const SERVICE_IP_WHITELIST: u8 = 13;

/// Case codes (two digits).
pub const CASE_PERMISSION_DENIED: u8 = 27;
pub const CASE_ROUTE_NOT_FOUND: u8 = 42;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// `HTTP status (3 digits) + service (2 digits) + case (2 digits)`.
pub fn build_response_code(status: StatusCode, service: u8, case: u8) -> u32 {
    u32::from(status.as_u16()) * 10_000 + u32::from(service) * 100 + u32::from(case)
}

pub fn error_response(status: StatusCode, service: u8, case: u8, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        code: build_response_code(status, service, case),
        message: message.into(),
        data: None,
    };
    (status, Json(body)).into_response()
}

/// 403 for a denied request. The same response is used whether the address
/// was blocked or malformed.
pub fn forbidden(reason: DenyReason) -> Response {
    error_response(StatusCode::FORBIDDEN, SERVICE_IP_WHITELIST, CASE_PERMISSION_DENIED, reason.to_string())
}

pub fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, SERVICE_COMMON, CASE_ROUTE_NOT_FOUND, "Route not found")
}
