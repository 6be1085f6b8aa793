//! Transaction command implementations

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use jagadoku_core::models::{format_idr, parse_amount, NewTransaction, TransactionType};
use jagadoku_core::AppContext;

use super::truncate;

pub fn cmd_transactions_list(ctx: &AppContext, limit: usize, date: Option<NaiveDate>) -> Result<()> {
    let transactions: Vec<_> = ctx
        .transactions()
        .iter()
        .filter(|tx| date.map_or(true, |d| tx.date == d))
        .collect();

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  jagadoku transactions add --amount 50000 --category Makanan --description \"Makan siang\"");
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        let amount_str = if tx.is_expense() {
            format!("\x1b[31m-{}\x1b[0m", format_idr(tx.amount)) // Red for expenses
        } else {
            format!("\x1b[32m+{}\x1b[0m", format_idr(tx.amount)) // Green for income
        };

        println!(
            "   {} │ {} │ {:>16} │ {:<14} │ {}",
            &tx.id[..8.min(tx.id.len())],
            tx.date,
            amount_str,
            tx.category,
            truncate(&tx.description, 30)
        );
    }

    if transactions.len() > limit {
        println!();
        println!("   ... {} more (use --limit)", transactions.len() - limit);
    }

    Ok(())
}

pub fn cmd_transactions_add(
    ctx: &mut AppContext,
    amount: &str,
    kind: TransactionType,
    category: &str,
    description: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let Some(amount) = parse_amount(amount) else {
        println!("⚠️  Amount is required (e.g. 75000 or 1.250.000). Nothing recorded.");
        return Ok(());
    };

    if !kind.categories().contains(&category) {
        println!(
            "   💡 '{}' is not a standard {} category (see: jagadoku categories)",
            category,
            kind.as_str().to_lowercase()
        );
    }

    let input = NewTransaction {
        amount,
        kind,
        category: category.to_string(),
        description: description.to_string(),
        date: date.unwrap_or_else(|| Local::now().date_naive()),
    };

    match ctx.add_transaction(input)? {
        Some(tx) => {
            println!(
                "✅ Recorded {} {} for {} ({})",
                tx.kind.as_str().to_lowercase(),
                format_idr(tx.amount),
                tx.description,
                tx.date
            );
            println!("   ID: {}", tx.id);
        }
        None => println!("⚠️  A description and a non-negative amount are required. Nothing recorded."),
    }

    Ok(())
}

/// Accepts the full id or a unique prefix as shown by `transactions list`
pub fn cmd_transactions_delete(ctx: &mut AppContext, id: &str) -> Result<()> {
    let matches: Vec<String> = ctx
        .transactions()
        .iter()
        .filter(|tx| tx.id.starts_with(id))
        .map(|tx| tx.id.clone())
        .collect();

    let full_id = match matches.as_slice() {
        [only] => only.clone(),
        [] => bail!("Transaction {} not found", id),
        _ => bail!("ID prefix {} matches {} transactions", id, matches.len()),
    };

    tracing::debug!("Resolved '{}' to transaction {}", id, full_id);
    ctx.delete_transaction(&full_id)?;
    println!("✅ Deleted transaction {}", full_id);
    Ok(())
}
