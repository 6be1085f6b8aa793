//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use jagadoku_core::export::ExportFormat;
use jagadoku_core::models::TransactionType;

/// JagaDoku - Keep track of your money
#[derive(Parser)]
#[command(name = "jagadoku")]
#[command(about = "Personal finance tracker with Google Sheets sync and AI advice", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "jagadoku.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set JAGADOKU_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show income, expenses, balance and where the money went
    Dashboard {
        /// Only count transactions on this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Manage transactions (list, add, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage savings goals (list, add, contribute)
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Project compound growth of a monthly investment
    Simulate {
        /// Starting balance
        #[arg(long, default_value = "1000000")]
        initial: f64,

        /// Amount added every month
        #[arg(long, default_value = "500000")]
        monthly: f64,

        /// Expected annual return in percent
        #[arg(long, default_value = "10")]
        rate: f64,

        /// Horizon in years
        #[arg(long, default_value = "10")]
        years: u32,
    },

    /// Ask the AI backend for saving tips and investment ideas
    Advise,

    /// Sign in with a Google access token
    ///
    /// Without --token, prints the Google sign-in URL to obtain one.
    Login {
        /// OAuth access token
        #[arg(long)]
        token: Option<String>,
    },

    /// Start a local-only guest session
    Guest {
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
    },

    /// End the session; local data is kept
    Logout,

    /// Show who is signed in
    Whoami,

    /// Copy all transactions and goals to your Google spreadsheet
    Sync,

    /// Export the ledger to files
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// csv (one file per sheet) or json (full backup)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },

    /// Replace the ledger with a JSON backup
    Restore {
        /// Backup file written by `export --format json`
        #[arg(short, long)]
        file: PathBuf,

        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// List recommended categories
    Categories,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from JAGADOKU_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only transactions on this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Record a transaction
    Add {
        /// Amount, e.g. 75000 or 1.250.000
        #[arg(short, long)]
        amount: String,

        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,

        /// Category (see `jagadoku categories`)
        #[arg(short, long)]
        category: String,

        /// What it was for
        #[arg(short, long)]
        description: String,

        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals with progress
    List,
    /// Create a savings goal
    Add {
        /// Goal name
        #[arg(short, long)]
        name: String,

        /// Target amount, e.g. 10.000.000
        #[arg(short, long)]
        target: String,

        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: NaiveDate,
    },
    /// Add to (or, with a negative amount, withdraw from) a goal
    Contribute {
        /// Goal ID
        id: String,

        /// Amount, e.g. 500.000 or -250000
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}
