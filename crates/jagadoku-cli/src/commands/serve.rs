//! Server command implementation

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::{load_config, open_context};

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    // Comma-separated API keys from environment
    let api_keys =
        jagadoku_server::parse_api_keys(&std::env::var("JAGADOKU_API_KEYS").unwrap_or_default());

    if !no_auth && api_keys.is_empty() {
        bail!("No API keys configured. Set JAGADOKU_API_KEYS or pass --no-auth for local development");
    }

    println!("🚀 Starting JagaDoku web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!(
            "   🔑 API keys: {} configured (JAGADOKU_API_KEYS)",
            api_keys.len()
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let ctx = open_context(db_path, no_encrypt)?;
    let backends = jagadoku_server::Backends::from_config(&load_config()?);

    let config = jagadoku_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    jagadoku_server::serve_with_config(ctx, backends, host, port, static_dir_str, config).await?;

    Ok(())
}
