//! Spreadsheet sync with pluggable backends
//!
//! The ledger is mirrored into two regions of a user-owned spreadsheet:
//! `Transaksi` and `Tabungan`. Every sync clears each region and rewrites it
//! from A1, so the remote copy always equals the local snapshot. There is no
//! append, merge or retry.
//!
//! # Architecture
//!
//! - `SpreadsheetBackend` trait defines the remote operations
//! - `GoogleSheetsClient` talks to the Google Sheets v4 REST API
//! - `MockSheets` keeps spreadsheets in memory for tests and offline demos

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::ledger::LedgerSnapshot;
use crate::models::{SavingsGoal, Transaction};

mod google;
mod mock;

pub use google::{GoogleSheetsClient, SHEETS_API_BASE};
pub use mock::MockSheets;

/// Region holding transactions
pub const TRANSACTIONS_SHEET: &str = "Transaksi";
/// Region holding savings goals
pub const GOALS_SHEET: &str = "Tabungan";
/// Title of a newly provisioned spreadsheet
pub const SPREADSHEET_TITLE: &str = "JagaDoku - Data Finansial Saya";

pub const TRANSACTION_HEADER: [&str; 6] = ["ID", "Tanggal", "Deskripsi", "Kategori", "Tipe", "Jumlah"];
pub const GOAL_HEADER: [&str; 5] = ["ID", "Nama Target", "Target", "Terkumpul", "Deadline"];

/// One spreadsheet row; text cells are strings, amounts are numbers
pub type Row = Vec<Value>;

/// Header row followed by one row per transaction, in ledger order
pub fn transaction_rows(transactions: &[Transaction]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(transactions.len() + 1);
    rows.push(TRANSACTION_HEADER.iter().map(|h| json!(h)).collect());
    rows.extend(transactions.iter().map(|t| {
        vec![
            json!(t.id),
            json!(t.date.format("%Y-%m-%d").to_string()),
            json!(t.description),
            json!(t.category),
            json!(t.kind.as_str()),
            json!(t.amount),
        ]
    }));
    rows
}

/// Header row followed by one row per goal, in insertion order
pub fn goal_rows(goals: &[SavingsGoal]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(goals.len() + 1);
    rows.push(GOAL_HEADER.iter().map(|h| json!(h)).collect());
    rows.extend(goals.iter().map(|g| {
        vec![
            json!(g.id),
            json!(g.name),
            json!(g.target_amount),
            json!(g.current_amount),
            json!(g.deadline.format("%Y-%m-%d").to_string()),
        ]
    }));
    rows
}

/// Remote tabular store
///
/// Every call carries the user's OAuth bearer token. Implementations report an
/// expired or rejected token as `Error::Auth`.
#[async_trait]
pub trait SpreadsheetBackend: Send + Sync {
    /// Human-readable name for this backend
    fn name(&self) -> &str;

    /// Create a spreadsheet with the given sheets and return its id
    async fn create_spreadsheet(&self, token: &str, title: &str, sheets: &[&str])
        -> Result<String>;

    /// Remove all values in `range`
    async fn clear_values(&self, token: &str, spreadsheet_id: &str, range: &str) -> Result<()>;

    /// Write `rows` starting at the top-left cell of `range`
    async fn write_values(
        &self,
        token: &str,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Row],
    ) -> Result<()>;
}

/// Row counts written by a successful sync (headers excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub transactions: usize,
    pub goals: usize,
}

/// Replace one region with `rows`
async fn overwrite_region<B: SpreadsheetBackend + ?Sized>(
    backend: &B,
    token: &str,
    spreadsheet_id: &str,
    sheet: &str,
    rows: &[Row],
) -> Result<()> {
    backend.clear_values(token, spreadsheet_id, sheet).await?;
    backend
        .write_values(token, spreadsheet_id, &format!("{}!A1", sheet), rows)
        .await
}

/// Mirror the snapshot into the spreadsheet.
///
/// Transactions are written before goals. Any failure along the way becomes a
/// single `Error::Sync`; regions already written are left as they are.
pub async fn sync_ledger<B: SpreadsheetBackend + ?Sized>(
    backend: &B,
    token: &str,
    spreadsheet_id: &str,
    snapshot: &LedgerSnapshot,
) -> Result<SyncReport> {
    let result = async {
        overwrite_region(
            backend,
            token,
            spreadsheet_id,
            TRANSACTIONS_SHEET,
            &transaction_rows(&snapshot.transactions),
        )
        .await?;
        overwrite_region(
            backend,
            token,
            spreadsheet_id,
            GOALS_SHEET,
            &goal_rows(&snapshot.goals),
        )
        .await
    }
    .await;

    match result {
        Ok(()) => {
            let report = SyncReport {
                transactions: snapshot.transactions.len(),
                goals: snapshot.goals.len(),
            };
            info!(
                backend = backend.name(),
                transactions = report.transactions,
                goals = report.goals,
                "Ledger synced"
            );
            Ok(report)
        }
        Err(Error::Sync(msg)) => Err(Error::Sync(msg)),
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "Sync failed");
            Err(Error::Sync(e.to_string()))
        }
    }
}

/// Return `existing` if set, otherwise provision a new spreadsheet.
///
/// Provisioning failure is `Error::RemoteCreation`.
pub async fn ensure_spreadsheet<B: SpreadsheetBackend + ?Sized>(
    backend: &B,
    token: &str,
    existing: Option<&str>,
) -> Result<String> {
    if let Some(id) = existing {
        return Ok(id.to_string());
    }

    match backend
        .create_spreadsheet(token, SPREADSHEET_TITLE, &[TRANSACTIONS_SHEET, GOALS_SHEET])
        .await
    {
        Ok(id) => {
            info!(backend = backend.name(), spreadsheet_id = %id, "Spreadsheet created");
            Ok(id)
        }
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "Spreadsheet creation failed");
            Err(Error::RemoteCreation(e.to_string()))
        }
    }
}
