//! JagaDoku Core Library
//!
//! Shared functionality for the JagaDoku personal finance tracker:
//! - Ledger of transactions and savings goals
//! - Dashboard aggregation and investment projection
//! - Encrypted local persistence
//! - Google sign-in and spreadsheet sync
//! - Pluggable AI backends for financial advice (Gemini, Ollama)
//! - Prompt library for customizable AI prompts
//! - CSV and JSON export

pub mod aggregation;
pub mod ai;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod goals;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod notifications;
pub mod projection;
pub mod prompts;
pub mod sync;

/// Test utilities including mock Google and AI servers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregation::{CategoryTotal, Dashboard, Summary};
pub use ai::{AIBackend, AIClient, AIInsight, InvestmentAdvice, MockBackend, RiskLevel};
pub use app::{AppContext, BusyFlag, BusyGuard};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use export::{ExportFormat, FullBackup};
pub use identity::{GoogleIdentity, IdentityProvider, StaticIdentity};
pub use ledger::{Ledger, LedgerSnapshot};
pub use models::{
    NewSavingsGoal, NewTransaction, Profile, SavingsGoal, Transaction, TransactionType,
    UserSession,
};
pub use notifications::{Level, Notification, NotificationKind};
pub use projection::{Projection, ProjectionParams, YearSample};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use sync::{GoogleSheetsClient, MockSheets, SpreadsheetBackend, SyncReport};
