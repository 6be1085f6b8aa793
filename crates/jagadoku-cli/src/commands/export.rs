//! Export and restore commands

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use jagadoku_core::export::{export_csv, export_json, read_backup, ExportFormat};
use jagadoku_core::AppContext;

pub fn cmd_export(ctx: &AppContext, dir: &Path, format: ExportFormat) -> Result<()> {
    let snapshot = ctx.snapshot();

    let paths = match format {
        ExportFormat::Csv => {
            export_csv(&snapshot, dir)
                .with_context(|| format!("Failed to export to {}", dir.display()))?
                .paths
        }
        ExportFormat::Json => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let file = dir.join(format!(
                "jagadoku-backup-{}.json",
                Local::now().format("%Y%m%d-%H%M%S")
            ));
            vec![export_json(&snapshot, &file)
                .with_context(|| format!("Failed to write {}", file.display()))?]
        }
    };

    println!(
        "✅ Exported {} transactions and {} goals",
        snapshot.transactions.len(),
        snapshot.goals.len()
    );
    for path in paths {
        println!("   {}", path.display());
    }
    Ok(())
}

pub fn cmd_restore(ctx: &mut AppContext, file: &Path, yes: bool) -> Result<()> {
    let backup = read_backup(file)
        .with_context(|| format!("Failed to read backup {}", file.display()))?;
    tracing::debug!(
        "Backup {} holds {} transactions and {} goals",
        file.display(),
        backup.transactions.len(),
        backup.goals.len()
    );

    if !yes {
        println!(
            "This will replace {} transactions and {} goals with {} transactions and {} goals from {}.",
            ctx.transactions().len(),
            ctx.goals().len(),
            backup.transactions.len(),
            backup.goals.len(),
            file.display()
        );
        print!("Continue? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    ctx.restore(backup.into_snapshot())?;
    println!(
        "✅ Restored {} transactions and {} goals",
        ctx.transactions().len(),
        ctx.goals().len()
    );
    Ok(())
}
