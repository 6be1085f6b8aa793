//! Google Sheets sync command

use anyhow::Result;
use jagadoku_core::sync::SpreadsheetBackend;
use jagadoku_core::AppContext;

use super::print_notifications;

pub async fn cmd_sync<S: SpreadsheetBackend + ?Sized>(ctx: &mut AppContext, sheets: &S) -> Result<()> {
    println!("🔄 Syncing to Google Sheets...");
    let result = ctx.sync(sheets).await;
    print_notifications(ctx);
    let report = result.inspect_err(|e| tracing::warn!("Sync failed: {}", e))?;

    println!(
        "   {} transactions, {} goals written",
        report.transactions, report.goals
    );
    if let Some(id) = ctx.known_spreadsheet_id() {
        println!("   📄 https://docs.google.com/spreadsheets/d/{}", id);
    }
    Ok(())
}
