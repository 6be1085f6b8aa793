//! Liveness endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Configured AI backend, if any
    pub ai: Option<&'static str>,
    pub sheets: String,
}

/// GET /api/health - No authentication, no remote calls
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        ai: state.ai.as_ref().map(|c| c.backend_name()),
        sheets: state.sheets.name().to_string(),
    })
}
