//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_ai` - Resolve the AI backend from config file and environment
//! - `cmd_init` - Initialize the database
//! - `cmd_currency` - Show or set the display currency

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tally_core::ai::AIClient;
use tally_core::{AiConfig, Categorizer, Database, InsightService};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// AI backend resolved for one CLI invocation
pub struct AiSetup {
    pub client: Option<AIClient>,
    pub timeout: Duration,
}

/// Load the AI configuration: `--ai-config` file or the default location,
/// then `TALLY_AI_*` environment overrides
pub fn load_ai_config(path: Option<&Path>) -> Result<AiConfig> {
    AiConfig::load(path).context("Failed to load AI configuration")
}

pub fn load_ai(path: Option<&Path>) -> Result<AiSetup> {
    let config = load_ai_config(path)?;
    let client = AIClient::from_config(&config).context("Failed to set up AI backend")?;
    Ok(AiSetup {
        client,
        timeout: config.timeout,
    })
}

pub fn categorizer(ai: &AiSetup) -> Categorizer {
    Categorizer::new(ai.client.clone(), ai.timeout)
}

pub fn insight_service(db: &Database, ai: &AiSetup) -> InsightService {
    InsightService::new(db.clone(), ai.client.clone(), ai.timeout)
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Opening runs the migrations
    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: tally expenses add -d \"Lunch\" -a 250");
    println!("  2. Set a budget:      tally budgets set --total 20000");
    println!("  3. Start web API:     tally serve");

    Ok(())
}

pub fn cmd_currency(db: &Database, owner: &str, code: Option<&str>) -> Result<()> {
    match code {
        Some(code) => {
            let stored = db.set_currency(owner, code)?;
            println!("✅ Currency set to {}", stored);
        }
        None => {
            println!("{}", db.get_currency(owner)?);
        }
    }
    Ok(())
}
