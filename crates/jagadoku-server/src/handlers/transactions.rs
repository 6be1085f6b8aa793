//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use jagadoku_core::aggregation::filter_by_date;
use jagadoku_core::models::{NewTransaction, Transaction, TransactionType};

use super::{parse_date_param, today, AmountInput};
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Only transactions on this day (YYYY-MM-DD)
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub total: usize,
}

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    let date = parse_date_param(params.date.as_deref())?;
    let ctx = state.ctx.lock().await;
    let transactions = filter_by_date(ctx.transactions(), date);

    Ok(Json(TransactionResponse {
        total: transactions.len(),
        transactions,
    }))
}

/// Request body for creating a transaction.
///
/// Missing or blank fields are not an error: nothing is recorded and
/// `created` comes back null.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: Option<AmountInput>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct CreatedResponse<T> {
    pub created: Option<T>,
}

/// POST /api/transactions - Record an income or expense
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<Json<CreatedResponse<Transaction>>, AppError> {
    let Some(amount) = body.amount.as_ref().and_then(AmountInput::value) else {
        return Ok(Json(CreatedResponse { created: None }));
    };

    let input = NewTransaction {
        amount,
        kind: body.kind,
        category: body.category,
        description: body.description,
        date: body.date.unwrap_or_else(today),
    };

    let created = state.ctx.lock().await.add_transaction(input)?;
    Ok(Json(CreatedResponse { created }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// DELETE /api/transactions/:id - Remove a transaction (unknown ids are a no-op)
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = state.ctx.lock().await.delete_transaction(&id)?;
    Ok(Json(DeleteResponse { deleted }))
}
