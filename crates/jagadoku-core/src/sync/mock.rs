//! In-memory spreadsheet backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Row, SpreadsheetBackend};
use crate::error::{Error, Result};

#[derive(Default)]
struct MockState {
    /// spreadsheet id -> sheet name -> rows
    spreadsheets: HashMap<String, HashMap<String, Vec<Row>>>,
    calls: Vec<String>,
    revoked: Vec<String>,
    fail_create: bool,
    fail_sheet: Option<String>,
}

/// Spreadsheet store kept in process memory
///
/// Cloning shares the same store, so a test can hand one clone to the code
/// under test and inspect the other.
#[derive(Clone, Default)]
pub struct MockSheets {
    state: Arc<Mutex<MockState>>,
}

/// Sheet name part of an A1 range ("Transaksi!A1" -> "Transaksi")
fn sheet_of(range: &str) -> &str {
    range.split('!').next().unwrap_or(range)
}

impl MockSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every spreadsheet creation fail
    pub fn fail_create(self) -> Self {
        self.lock().fail_create = true;
        self
    }

    /// Make writes and clears on `sheet` fail
    pub fn fail_writes_to(self, sheet: &str) -> Self {
        self.lock().fail_sheet = Some(sheet.to_string());
        self
    }

    /// Treat `token` as expired from now on
    pub fn revoke(&self, token: &str) {
        self.lock().revoked.push(token.to_string());
    }

    /// Current contents of one sheet
    pub fn sheet(&self, spreadsheet_id: &str, sheet: &str) -> Option<Vec<Row>> {
        self.lock()
            .spreadsheets
            .get(spreadsheet_id)
            .and_then(|s| s.get(sheet))
            .cloned()
    }

    pub fn spreadsheet_count(&self) -> usize {
        self.lock().spreadsheets.len()
    }

    /// Log of operations, e.g. `"create"`, `"clear Transaksi"`, `"write Transaksi!A1"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(state: &MockState, token: &str, spreadsheet_id: &str, range: &str) -> Result<()> {
        if token.is_empty() || state.revoked.iter().any(|t| t == token) {
            return Err(Error::Auth("Token expired".into()));
        }
        if state.fail_sheet.as_deref() == Some(sheet_of(range)) {
            return Err(Error::Sync(format!("Write to {} rejected", range)));
        }
        if !state.spreadsheets.contains_key(spreadsheet_id) {
            return Err(Error::NotFound(format!("Spreadsheet {}", spreadsheet_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SpreadsheetBackend for MockSheets {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_spreadsheet(
        &self,
        token: &str,
        _title: &str,
        sheets: &[&str],
    ) -> Result<String> {
        let mut state = self.lock();
        state.calls.push("create".to_string());

        if token.is_empty() || state.revoked.iter().any(|t| t == token) {
            return Err(Error::Auth("Token expired".into()));
        }
        if state.fail_create {
            return Err(Error::RemoteCreation("Mock creation failure".into()));
        }

        let id = format!("mock-sheet-{}", state.spreadsheets.len() + 1);
        let regions = sheets
            .iter()
            .map(|s| (s.to_string(), Vec::new()))
            .collect();
        state.spreadsheets.insert(id.clone(), regions);
        Ok(id)
    }

    async fn clear_values(&self, token: &str, spreadsheet_id: &str, range: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(format!("clear {}", range));
        Self::check(&state, token, spreadsheet_id, range)?;

        if let Some(sheet) = state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .and_then(|s| s.get_mut(sheet_of(range)))
        {
            sheet.clear();
        }
        Ok(())
    }

    async fn write_values(
        &self,
        token: &str,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Row],
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(format!("write {}", range));
        Self::check(&state, token, spreadsheet_id, range)?;

        let sheet = state
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default()
            .entry(sheet_of(range).to_string())
            .or_default();

        // Values land from the top-left; rows below the written block stay
        for (i, row) in rows.iter().enumerate() {
            if i < sheet.len() {
                sheet[i] = row.clone();
            } else {
                sheet.push(row.clone());
            }
        }
        Ok(())
    }
}
