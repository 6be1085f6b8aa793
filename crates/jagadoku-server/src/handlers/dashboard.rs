//! Dashboard, categories and simulator handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use jagadoku_core::aggregation::Dashboard;
use jagadoku_core::models::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};
use jagadoku_core::projection::{project, Projection, ProjectionParams};

use super::parse_date_param;
use crate::{AppError, AppState, MAX_PROJECTION_YEARS};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Restrict to one day (YYYY-MM-DD); omit for all time
    pub date: Option<String>,
}

/// GET /api/dashboard - Totals, expense breakdown and recent activity
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let date = parse_date_param(params.date.as_deref())?;
    let ctx = state.ctx.lock().await;
    Ok(Json(ctx.dashboard(date)))
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub income: &'static [&'static str],
    pub expense: &'static [&'static str],
}

/// GET /api/categories - Recommended categories per transaction type
pub async fn list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        income: INCOME_CATEGORIES,
        expense: EXPENSE_CATEGORIES,
    })
}

/// Simulator query; missing values fall back to the form defaults
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateQuery {
    pub initial_amount: Option<f64>,
    pub monthly_contribution: Option<f64>,
    pub annual_return_percent: Option<f64>,
    pub years: Option<u32>,
}

/// GET /api/simulate - Project compound growth of regular contributions
pub async fn simulate(Query(query): Query<SimulateQuery>) -> Result<Json<Projection>, AppError> {
    let defaults = ProjectionParams::default();
    let params = ProjectionParams {
        initial_amount: query.initial_amount.unwrap_or(defaults.initial_amount),
        monthly_contribution: query
            .monthly_contribution
            .unwrap_or(defaults.monthly_contribution),
        annual_return_percent: query
            .annual_return_percent
            .unwrap_or(defaults.annual_return_percent),
        years: query.years.unwrap_or(defaults.years),
    };

    if params.years > MAX_PROJECTION_YEARS {
        return Err(AppError::bad_request(&format!(
            "years must be at most {}",
            MAX_PROJECTION_YEARS
        )));
    }
    let finite = [
        params.initial_amount,
        params.monthly_contribution,
        params.annual_return_percent,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err(AppError::bad_request("Amounts must be finite numbers"));
    }

    Ok(Json(project(&params)))
}
