//! Savings goal commands

use anyhow::{bail, Result};
use chrono::NaiveDate;
use jagadoku_core::goals::{is_complete, progress_percent, remaining};
use jagadoku_core::models::{format_idr, parse_amount, NewSavingsGoal};
use jagadoku_core::AppContext;

const BAR_WIDTH: usize = 20;

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn cmd_goals_list(ctx: &AppContext) -> Result<()> {
    let goals = ctx.goals();
    if goals.is_empty() {
        println!("No savings goals yet. Create one with:");
        println!("  jagadoku goals add --name \"Dana Darurat\" --target 10.000.000 --deadline 2025-12-31");
        return Ok(());
    }

    println!();
    println!("🎯 Savings Goals");
    println!("   ─────────────────────────────────────────────────────────────");
    for goal in goals {
        let percent = progress_percent(goal);
        let status = if is_complete(goal) { " ✅" } else { "" };
        println!("   {}{}  (deadline {})", goal.name, status, goal.deadline);
        println!(
            "      {} {:>5.1}%  {} / {}",
            progress_bar(percent),
            percent,
            format_idr(goal.current_amount),
            format_idr(goal.target_amount)
        );
        if !is_complete(goal) {
            println!("      {} to go", format_idr(remaining(goal)));
        }
        println!("      ID: {}", goal.id);
    }

    Ok(())
}

pub fn cmd_goals_add(ctx: &mut AppContext, name: &str, target: &str, deadline: NaiveDate) -> Result<()> {
    let Some(target_amount) = parse_amount(target) else {
        println!("⚠️  Target amount is required (e.g. 10.000.000). Nothing created.");
        return Ok(());
    };

    let input = NewSavingsGoal {
        name: name.to_string(),
        target_amount,
        deadline,
    };
    match ctx.add_goal(input)? {
        Some(goal) => {
            println!(
                "✅ Created goal '{}' for {} by {}",
                goal.name,
                format_idr(goal.target_amount),
                goal.deadline
            );
            println!("   ID: {}", goal.id);
        }
        None => println!("⚠️  A name and a positive target are required. Nothing created."),
    }
    Ok(())
}

pub fn cmd_goals_contribute(ctx: &mut AppContext, id: &str, amount: &str) -> Result<()> {
    if !ctx.goals().iter().any(|g| g.id == id) {
        bail!("Goal {} not found", id);
    }

    match ctx.contribute_input(id, amount)? {
        Some(goal) => {
            println!(
                "✅ {}: {} / {} ({:.1}%)",
                goal.name,
                format_idr(goal.current_amount),
                format_idr(goal.target_amount),
                progress_percent(&goal)
            );
            if is_complete(&goal) {
                println!("🎉 Target reached!");
            }
        }
        None => println!("⚠️  '{}' is not an amount. Nothing changed.", amount),
    }
    Ok(())
}
