//! Typed load/save over the key/value table

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{SavingsGoal, Transaction, UserSession};

pub const KEY_TRANSACTIONS: &str = "transactions";
pub const KEY_GOALS: &str = "goals";
pub const KEY_USER: &str = "user";

impl Database {
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_blob(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::InvalidData(format!("Stored '{}' is unreadable: {}", key, e))),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.put_blob(key, &raw)
    }

    /// Stored transactions, newest first. Missing state is an empty ledger.
    pub fn load_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.load_json(KEY_TRANSACTIONS)?.unwrap_or_default())
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.save_json(KEY_TRANSACTIONS, transactions)
    }

    /// Stored goals in insertion order
    pub fn load_goals(&self) -> Result<Vec<SavingsGoal>> {
        Ok(self.load_json(KEY_GOALS)?.unwrap_or_default())
    }

    pub fn save_goals(&self, goals: &[SavingsGoal]) -> Result<()> {
        self.save_json(KEY_GOALS, goals)
    }

    /// Replace transactions and goals together
    pub fn save_ledger(&self, transactions: &[Transaction], goals: &[SavingsGoal]) -> Result<()> {
        self.put_blobs(&[
            (KEY_TRANSACTIONS, serde_json::to_string(transactions)?),
            (KEY_GOALS, serde_json::to_string(goals)?),
        ])
    }

    pub fn load_user(&self) -> Result<Option<UserSession>> {
        self.load_json(KEY_USER)
    }

    /// Store the session, or remove it when `None` (logout)
    pub fn save_user(&self, user: Option<&UserSession>) -> Result<()> {
        match user {
            Some(u) => self.save_json(KEY_USER, u),
            None => self.delete_blob(KEY_USER).map(|_| ()),
        }
    }
}
