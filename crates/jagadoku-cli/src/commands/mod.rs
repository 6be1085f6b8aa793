//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, open_context, load_config) and init/categories
//! - `dashboard` - Dashboard summary
//! - `transactions` - Transaction commands (list, add, delete)
//! - `goals` - Savings goal commands (list, add, contribute)
//! - `simulate` - Investment projection
//! - `advise` - AI advice
//! - `session` - Login, guest mode, logout, whoami
//! - `sync` - Google Sheets sync
//! - `export` - CSV/JSON export and restore
//! - `serve` - Web server command

pub mod advise;
pub mod core;
pub mod dashboard;
pub mod export;
pub mod goals;
pub mod serve;
pub mod session;
pub mod simulate;
pub mod sync;
pub mod transactions;

// Re-export command functions for main.rs
pub use advise::*;
pub use core::*;
pub use dashboard::*;
pub use export::*;
pub use goals::*;
pub use serve::*;
pub use session::*;
pub use simulate::*;
pub use sync::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
