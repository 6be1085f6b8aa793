//! Ledger store: the in-memory source of truth for transactions and goals
//!
//! Transactions are kept newest first (new entries are prepended). Goals keep
//! insertion order. Derived views are always recomputed from here.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::goals;
use crate::models::{NewSavingsGoal, NewTransaction, SavingsGoal, Transaction};

/// Owned copy of the ledger handed to sync and advice requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub transactions: Vec<Transaction>,
    pub goals: Vec<SavingsGoal>,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    goals: Vec<SavingsGoal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted collections, keeping their order
    pub fn from_parts(transactions: Vec<Transaction>, goals: Vec<SavingsGoal>) -> Self {
        Self {
            transactions,
            goals,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn goals(&self) -> &[SavingsGoal] {
        &self.goals
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            transactions: self.transactions.clone(),
            goals: self.goals.clone(),
        }
    }

    /// Prepend an already-built transaction.
    ///
    /// Fails with `InvalidData` if the id is already present.
    pub fn insert_transaction(&mut self, tx: Transaction) -> Result<()> {
        if self.transactions.iter().any(|t| t.id == tx.id) {
            return Err(Error::InvalidData(format!(
                "Duplicate transaction id: {}",
                tx.id
            )));
        }
        debug!(id = %tx.id, amount = tx.amount, kind = %tx.kind, "Adding transaction");
        self.transactions.insert(0, tx);
        Ok(())
    }

    /// Validate input and prepend a new transaction.
    ///
    /// Invalid input is a no-op and returns `Ok(None)`.
    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Option<Transaction>> {
        let Some(tx) = Transaction::create(input) else {
            debug!("Ignoring incomplete transaction input");
            return Ok(None);
        };
        self.insert_transaction(tx.clone())?;
        Ok(Some(tx))
    }

    /// Remove a transaction by id. Returns false if nothing matched.
    pub fn remove_transaction(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }

    /// Validate input and append a new goal. Invalid input returns `Ok(None)`.
    pub fn add_goal(&mut self, input: NewSavingsGoal) -> Result<Option<SavingsGoal>> {
        let Some(goal) = SavingsGoal::create(input) else {
            debug!("Ignoring incomplete goal input");
            return Ok(None);
        };
        self.insert_goal(goal.clone())?;
        Ok(Some(goal))
    }

    /// Append an already-built goal, rejecting duplicate ids
    pub fn insert_goal(&mut self, goal: SavingsGoal) -> Result<()> {
        if self.find_goal(&goal.id).is_some() {
            return Err(Error::InvalidData(format!("Duplicate goal id: {}", goal.id)));
        }
        debug!(id = %goal.id, name = %goal.name, target = goal.target_amount, "Adding goal");
        self.goals.push(goal);
        Ok(())
    }

    /// Add `delta` to a goal's saved amount and return the updated goal
    pub fn contribute_to_goal(&mut self, id: &str, delta: f64) -> Result<SavingsGoal> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))?;
        *goal = goals::contribute(goal, delta);
        Ok(goal.clone())
    }

    pub fn find_goal(&self, id: &str) -> Option<&SavingsGoal> {
        self.goals.iter().find(|g| g.id == id)
    }
}
