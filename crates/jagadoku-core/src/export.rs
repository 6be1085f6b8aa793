//! Offline export of the ledger
//!
//! Supports:
//! - CSV files with the same layout as the spreadsheet regions
//! - Full JSON backup export/import

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::ledger::LedgerSnapshot;
use crate::models::{SavingsGoal, Transaction};
use crate::sync::{goal_rows, transaction_rows, Row};

pub const TRANSACTIONS_FILE: &str = "transaksi.csv";
pub const GOALS_FILE: &str = "tabungan.csv";

/// Current backup format version
pub const BACKUP_VERSION: u32 = 1;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (expected csv or json)", s)),
        }
    }
}

/// Files written by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub paths: Vec<PathBuf>,
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn rows_to_csv(rows: &[Row]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record(row.iter().map(cell_text))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidData(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}

/// Transactions as CSV, header first, ledger order
pub fn transactions_csv(transactions: &[Transaction]) -> Result<String> {
    rows_to_csv(&transaction_rows(transactions))
}

/// Goals as CSV, header first, insertion order
pub fn goals_csv(goals: &[SavingsGoal]) -> Result<String> {
    rows_to_csv(&goal_rows(goals))
}

/// Write `transaksi.csv` and `tabungan.csv` into `dir`, creating it if needed
pub fn export_csv(snapshot: &LedgerSnapshot, dir: &Path) -> Result<ExportedFiles> {
    fs::create_dir_all(dir)?;

    let tx_path = dir.join(TRANSACTIONS_FILE);
    fs::write(&tx_path, transactions_csv(&snapshot.transactions)?)?;
    let goal_path = dir.join(GOALS_FILE);
    fs::write(&goal_path, goals_csv(&snapshot.goals)?)?;

    info!(
        dir = %dir.display(),
        transactions = snapshot.transactions.len(),
        goals = snapshot.goals.len(),
        "Exported CSV"
    );
    Ok(ExportedFiles {
        paths: vec![tx_path, goal_path],
    })
}

/// Complete ledger backup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullBackup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub goals: Vec<SavingsGoal>,
}

impl FullBackup {
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            transactions: snapshot.transactions.clone(),
            goals: snapshot.goals.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a backup, rejecting newer versions and duplicate ids
    pub fn from_json(raw: &str) -> Result<Self> {
        let backup: Self = serde_json::from_str(raw)
            .map_err(|e| Error::InvalidData(format!("Invalid backup: {}", e)))?;

        if backup.version > BACKUP_VERSION {
            return Err(Error::InvalidData(format!(
                "Backup version {} is newer than supported version {}",
                backup.version, BACKUP_VERSION
            )));
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = backup
            .transactions
            .iter()
            .map(|t| t.id.as_str())
            .chain(backup.goals.iter().map(|g| g.id.as_str()))
            .find(|id| !seen.insert(*id))
        {
            return Err(Error::InvalidData(format!("Duplicate id in backup: {}", dup)));
        }

        Ok(backup)
    }

    pub fn into_snapshot(self) -> LedgerSnapshot {
        LedgerSnapshot {
            transactions: self.transactions,
            goals: self.goals,
        }
    }
}

/// Write a JSON backup to `path`
pub fn export_json(snapshot: &LedgerSnapshot, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, FullBackup::from_snapshot(snapshot).to_json()?)?;
    info!(path = %path.display(), "Exported JSON backup");
    Ok(path.to_path_buf())
}

/// Read a JSON backup from `path`
pub fn read_backup(path: &Path) -> Result<FullBackup> {
    let raw = fs::read_to_string(path)?;
    FullBackup::from_json(&raw)
}
