//! Dashboard command

use anyhow::Result;
use chrono::NaiveDate;
use jagadoku_core::models::format_idr;
use jagadoku_core::AppContext;

use super::truncate;

pub fn cmd_dashboard(ctx: &AppContext, date: Option<NaiveDate>) -> Result<()> {
    let dashboard = ctx.dashboard(date);
    let summary = dashboard.summary;

    println!();
    match date {
        Some(d) => println!("📊 JagaDoku Dashboard ({})", d),
        None => println!("📊 JagaDoku Dashboard"),
    }
    println!("   ─────────────────────────────");
    println!("   Pemasukan:    {:>18}", format_idr(summary.income));
    println!("   Pengeluaran:  {:>18}", format_idr(summary.expenses));
    println!("   Saldo:        {:>18}", format_idr(summary.balance));

    if summary.balance < 0.0 {
        println!("   ⚠️  Spending exceeds income");
    }

    if !dashboard.categories.is_empty() {
        println!();
        println!("💸 Spending by category");
        for category in &dashboard.categories {
            let share = if summary.expenses > 0.0 {
                category.value / summary.expenses * 100.0
            } else {
                0.0
            };
            println!(
                "   {:<20} {:>18}  {:>5.1}%",
                category.name,
                format_idr(category.value),
                share
            );
        }
    }

    println!();
    if dashboard.recent.is_empty() {
        println!("No transactions yet. Add one with:");
        println!("  jagadoku transactions add --amount 50000 --category Makanan --description \"Makan siang\"");
        return Ok(());
    }

    println!("📝 Recent activity");
    for tx in &dashboard.recent {
        let sign = if tx.is_income() { "+" } else { "-" };
        println!(
            "   {} │ {}{:>16} │ {}",
            tx.date,
            sign,
            format_idr(tx.amount),
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}
