//! Spreadsheet sync and notification handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use jagadoku_core::notifications::Notification;
use jagadoku_core::sync::SyncReport;

use crate::{AppError, AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub spreadsheet_id: Option<String>,
    #[serde(flatten)]
    pub report: SyncReport,
}

/// POST /api/sync - Overwrite the user's spreadsheet with the local ledger
///
/// A second request while one is running gets 409.
pub async fn sync_now(State(state): State<Arc<AppState>>) -> Result<Json<SyncResponse>, AppError> {
    let job = state.ctx.lock().await.begin_sync()?;

    let outcome = job.run(state.sheets.as_ref()).await;

    let mut ctx = state.ctx.lock().await;
    let report = ctx.finish_sync(outcome)?;
    Ok(Json(SyncResponse {
        spreadsheet_id: ctx.known_spreadsheet_id(),
        report,
    }))
}

/// GET /api/notifications - Pending user notifications, oldest first
///
/// Returned notifications are removed from the queue.
pub async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.ctx.lock().await.drain_notifications())
}
