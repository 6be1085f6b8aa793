//! JagaDoku CLI - Personal finance tracker
//!
//! Usage:
//!   jagadoku init                         Initialize database
//!   jagadoku transactions add ...         Record income or an expense
//!   jagadoku login --token TOKEN          Sign in with Google
//!   jagadoku sync                         Copy the ledger to Google Sheets
//!   jagadoku serve --port 3000            Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Categories => commands::cmd_categories(),
        Commands::Simulate {
            initial,
            monthly,
            rate,
            years,
        } => commands::cmd_simulate(initial, monthly, rate, years),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Dashboard { date } => {
            let ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&ctx, date)
        }
        Commands::Transactions { action } => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&ctx, 20, None),
                Some(TransactionsAction::List { limit, date }) => {
                    commands::cmd_transactions_list(&ctx, limit, date)
                }
                Some(TransactionsAction::Add {
                    amount,
                    kind,
                    category,
                    description,
                    date,
                }) => commands::cmd_transactions_add(
                    &mut ctx,
                    &amount,
                    kind,
                    &category,
                    &description,
                    date,
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&mut ctx, &id)
                }
            }
        }
        Commands::Goals { action } => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(GoalsAction::List) => commands::cmd_goals_list(&ctx),
                Some(GoalsAction::Add {
                    name,
                    target,
                    deadline,
                }) => commands::cmd_goals_add(&mut ctx, &name, &target, deadline),
                Some(GoalsAction::Contribute { id, amount }) => {
                    commands::cmd_goals_contribute(&mut ctx, &id, &amount)
                }
            }
        }
        Commands::Advise => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config()?;
            commands::cmd_advise(&mut ctx, config.ai_client().as_ref()).await
        }
        Commands::Login { token } => {
            let config = commands::load_config()?;
            match token {
                None => commands::cmd_login_url(&config),
                Some(token) => {
                    let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
                    commands::cmd_login(
                        &mut ctx,
                        &token,
                        &config.identity(),
                        &config.sheets_client(),
                    )
                    .await
                }
            }
        }
        Commands::Guest { name } => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            commands::cmd_guest(&mut ctx, &name)
        }
        Commands::Logout => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            commands::cmd_logout(&mut ctx)
        }
        Commands::Whoami => {
            let ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            commands::cmd_whoami(&ctx)
        }
        Commands::Sync => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config()?;
            commands::cmd_sync(&mut ctx, &config.sheets_client()).await
        }
        Commands::Export { dir, format } => {
            let ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(&ctx, &dir, format)
        }
        Commands::Restore { file, yes } => {
            let mut ctx = commands::open_context(&cli.db, cli.no_encrypt)?;
            commands::cmd_restore(&mut ctx, &file, yes)
        }
    }
}
