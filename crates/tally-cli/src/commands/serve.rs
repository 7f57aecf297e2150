//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::{load_ai_config, open_db};

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    ai_config_path: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    // Comma-separated bearer keys
    let api_keys = tally_server::parse_api_keys(&std::env::var("TALLY_API_KEYS").unwrap_or_default());

    let ai_config = load_ai_config(ai_config_path)?;
    match ai_config.host {
        Some(ref ai_host) => println!(
            "   🤖 AI backend: {} ({}, {})",
            ai_host,
            ai_config.provider.as_str(),
            ai_config.model_name()
        ),
        None if ai_config.is_enabled() => {
            println!("   🤖 AI backend: {}", ai_config.provider.as_str())
        }
        None => println!("   💡 Tip: Set TALLY_AI_HOST for AI insights (rule-based until then)"),
    }

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   🔒 Authentication: required, but no keys configured");
        println!("      Set TALLY_API_KEYS (comma-separated) to allow API access");
    } else {
        println!(
            "   🔑 API keys: {} configured (TALLY_API_KEYS)",
            api_keys.len()
        );
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = tally_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
        ai_timeout: ai_config.timeout,
    };

    tally_server::serve_with_config(db, host, port, &ai_config, config).await?;

    Ok(())
}
