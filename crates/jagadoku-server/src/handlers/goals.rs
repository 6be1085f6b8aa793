//! Savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use jagadoku_core::goals::{is_complete, progress_percent, remaining};
use jagadoku_core::models::{NewSavingsGoal, SavingsGoal};

use super::transactions::CreatedResponse;
use super::AmountInput;
use crate::{AppError, AppState};

/// A goal with its derived progress
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: SavingsGoal,
    pub progress_percent: f64,
    pub remaining: f64,
    pub complete: bool,
}

impl From<SavingsGoal> for GoalView {
    fn from(goal: SavingsGoal) -> Self {
        Self {
            progress_percent: progress_percent(&goal),
            remaining: remaining(&goal),
            complete: is_complete(&goal),
            goal,
        }
    }
}

/// GET /api/goals - List goals in creation order
pub async fn list_goals(State(state): State<Arc<AppState>>) -> Json<Vec<GoalView>> {
    let ctx = state.ctx.lock().await;
    Json(ctx.goals().iter().cloned().map(GoalView::from).collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    #[serde(default)]
    pub name: String,
    pub target_amount: Option<AmountInput>,
    pub deadline: Option<NaiveDate>,
}

/// POST /api/goals - Create a savings goal; incomplete input yields `created: null`
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateGoalRequest>,
) -> Result<Json<CreatedResponse<GoalView>>, AppError> {
    let target = body.target_amount.as_ref().and_then(AmountInput::value);
    let (Some(target_amount), Some(deadline)) = (target, body.deadline) else {
        return Ok(Json(CreatedResponse { created: None }));
    };

    let created = state.ctx.lock().await.add_goal(NewSavingsGoal {
        name: body.name,
        target_amount,
        deadline,
    })?;
    Ok(Json(CreatedResponse {
        created: created.map(GoalView::from),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    /// Negative amounts withdraw
    pub amount: AmountInput,
}

#[derive(Serialize)]
pub struct ContributeResponse {
    pub updated: Option<GoalView>,
}

/// POST /api/goals/:id/contribute - Add to (or withdraw from) a goal
pub async fn contribute_to_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ContributeRequest>,
) -> Result<Json<ContributeResponse>, AppError> {
    let mut ctx = state.ctx.lock().await;
    let updated = match body.amount {
        AmountInput::Text(text) => ctx.contribute_input(&id, &text)?,
        AmountInput::Number(n) if n.is_finite() => Some(ctx.contribute_to_goal(&id, n)?),
        AmountInput::Number(_) => None,
    };

    Ok(Json(ContributeResponse {
        updated: updated.map(GoalView::from),
    }))
}
