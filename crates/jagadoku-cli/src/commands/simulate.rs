//! Investment simulator command

use anyhow::{bail, Result};
use jagadoku_core::models::format_idr;
use jagadoku_core::projection::{project, ProjectionParams};

pub fn cmd_simulate(initial: f64, monthly: f64, rate: f64, years: u32) -> Result<()> {
    if !(1..=40).contains(&years) {
        bail!("--years must be between 1 and 40");
    }
    if !(1.0..=30.0).contains(&rate) {
        println!("   💡 Typical expected returns are between 1% and 30% per year");
    }

    let projection = project(&ProjectionParams {
        initial_amount: initial,
        monthly_contribution: monthly,
        annual_return_percent: rate,
        years,
    });

    println!();
    println!(
        "📈 Projection: {} + {}/month at {}% for {} years",
        format_idr(initial),
        format_idr(monthly),
        rate,
        years
    );
    println!("   ─────────────────────────────");
    for sample in &projection.samples {
        println!("   Tahun {:>2}  {:>20}", sample.year, format_idr(sample.balance));
    }
    println!();
    println!("   Total invested:  {:>20}", format_idr(projection.total_invested));
    println!("   Final balance:   {:>20}", format_idr(projection.final_balance));
    println!("   Profit:          {:>20}", format_idr(projection.total_profit));
    match projection.roi {
        Some(roi) => println!("   ROI:             {:>19.1}%", roi),
        None => println!("   ROI:             {:>20}", "-"),
    }

    Ok(())
}
