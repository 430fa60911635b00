use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::ranges::{NetworkPrefix, RangeOrigin, RangeTable};
use crate::security::PolicySummary;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct RangeSummary {
    pub origin: RangeOrigin,
    pub count: usize,
    pub prefixes: Vec<NetworkPrefix>,
}

impl From<&RangeTable> for RangeSummary {
    fn from(table: &RangeTable) -> Self {
        Self {
            origin: table.origin().clone(),
            count: table.len(),
            prefixes: table.prefixes().to_vec(),
        }
    }
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_ranges(State(state): State<AppState>) -> Json<RangeSummary> {
    let table = state.gate.ranges.snapshot();
    Json(RangeSummary::from(table.as_ref()))
}

pub async fn reload_ranges(State(state): State<AppState>) -> Result<Json<RangeSummary>, StatusCode> {
    tracing::info!("Edge range reload requested via admin API");
    let table = state.gate.ranges.clone().spawn_reload().await.map_err(|e| {
        tracing::error!(error = %e, "Edge range reload task failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(RangeSummary::from(table.as_ref())))
}

pub async fn get_policy(State(state): State<AppState>) -> Json<PolicySummary> {
    Json(state.gate.policy.summary())
}
