//! Session commands: login, guest, logout, whoami

use anyhow::Result;
use jagadoku_core::identity::{authorization_url, IdentityProvider};
use jagadoku_core::sync::SpreadsheetBackend;
use jagadoku_core::{AppContext, Config};

use super::print_notifications;

/// Print where to obtain an access token
pub fn cmd_login_url(config: &Config) -> Result<()> {
    println!("🔑 Sign in with Google in your browser:");
    println!();
    println!(
        "   {}",
        authorization_url(&config.google.client_id, &config.google.redirect_uri)
    );
    println!();
    println!("After signing in, copy access_token from the redirected URL and run:");
    println!("  jagadoku login --token <access_token>");
    Ok(())
}

pub async fn cmd_login<I, S>(ctx: &mut AppContext, token: &str, identity: &I, sheets: &S) -> Result<()>
where
    I: IdentityProvider + ?Sized,
    S: SpreadsheetBackend + ?Sized,
{
    println!("🔑 Signing in...");
    let result = ctx.login(token.trim(), identity, sheets).await;
    print_notifications(ctx);
    let session = result.inspect_err(|e| tracing::warn!("Login failed: {}", e))?;

    println!("✅ Logged in as {} <{}>", session.name, session.email);
    match &session.spreadsheet_id {
        Some(id) => println!("   📄 Spreadsheet: {}", id),
        None => println!("   💡 No spreadsheet yet; 'jagadoku sync' will create one"),
    }
    Ok(())
}

pub fn cmd_guest(ctx: &mut AppContext, name: &str) -> Result<()> {
    let session = ctx.login_as_guest(name)?;
    println!("👋 Welcome, {}! Data stays on this device.", session.name);
    println!("   💡 Sign in with Google to back it up: jagadoku login");
    Ok(())
}

pub fn cmd_logout(ctx: &mut AppContext) -> Result<()> {
    if ctx.session().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    ctx.logout()?;
    println!("✅ Logged out. Your transactions and goals are still here.");
    Ok(())
}

pub fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    let Some(session) = ctx.session() else {
        println!("Not logged in. Use 'jagadoku login' or 'jagadoku guest'.");
        return Ok(());
    };

    if session.is_guest {
        println!("👤 {} (guest)", session.name);
        return Ok(());
    }

    println!("👤 {} <{}>", session.name, session.email);
    match &session.spreadsheet_id {
        Some(id) => println!("   📄 Spreadsheet: {}", id),
        None => println!("   📄 Spreadsheet: none"),
    }
    Ok(())
}
