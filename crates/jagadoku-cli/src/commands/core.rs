//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` / `open_context` - Shared utilities to open the database
//! - `load_config` - Config file plus environment
//! - `print_notifications` - Show queued user messages
//! - `cmd_init` - Initialize the database
//! - `cmd_categories` - List recommended categories

use std::path::Path;

use anyhow::{Context, Result};
use jagadoku_core::db::Database;
use jagadoku_core::models::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};
use jagadoku_core::notifications::Level;
use jagadoku_core::{AppContext, Config};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Open the database and load the ledger and session from it
pub fn open_context(db_path: &Path, no_encrypt: bool) -> Result<AppContext> {
    let db = open_db(db_path, no_encrypt)?;
    AppContext::open(db).context("Failed to load saved data")
}

pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Print and clear the notification queue
pub fn print_notifications(ctx: &mut AppContext) {
    for note in ctx.drain_notifications() {
        let icon = match note.level {
            Level::Success => "✅",
            Level::Error => "❌",
            Level::Info => "ℹ️ ",
        };
        println!("{} {}", icon, note.message);
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let ctx = open_context(db_path, no_encrypt)?;
    println!(
        "   {} transactions, {} goals",
        ctx.transactions().len(),
        ctx.goals().len()
    );

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a transaction: jagadoku transactions add --amount 50000 --category Makanan --description \"Makan siang\"");
    println!("  2. Sign in to sync: jagadoku login");
    println!("  3. Start web UI: jagadoku serve");

    Ok(())
}

pub fn cmd_categories() -> Result<()> {
    println!();
    println!("💰 Pemasukan (income)");
    for name in INCOME_CATEGORIES {
        println!("   • {}", name);
    }
    println!();
    println!("💸 Pengeluaran (expense)");
    for name in EXPENSE_CATEGORIES {
        println!("   • {}", name);
    }
    Ok(())
}
