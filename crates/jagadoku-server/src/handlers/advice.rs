//! AI advice handler

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use jagadoku_core::ai::AIInsight;

use crate::{AppError, AppState};

/// POST /api/advice - Ask the AI backend to analyze the ledger
pub async fn request_advice(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AIInsight>, AppError> {
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::unavailable("AI backend not configured"))?;

    let job = state.ctx.lock().await.begin_advice()?;
    let outcome = job.run(ai).await;
    let insight = state.ctx.lock().await.finish_advice(outcome)?;

    info!(
        tips = insight.saving_tips.len(),
        advice = insight.investment_advice.len(),
        "Advice generated"
    );
    Ok(Json(insight))
}
