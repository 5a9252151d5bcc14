//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `acting_caller` - Resolve who the command runs as
//! - `resolve_centre` - Look up a centre by id or name
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{bail, Context, Result};
use ecart_core::db::Database;
use ecart_core::models::Centre;
use ecart_core::{Caller, CentreStore, ReportConfig, UserStore};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Report settings from the config file (or defaults) plus environment override
pub fn load_report_config(path: Option<&Path>) -> Result<ReportConfig> {
    ReportConfig::load(path).context("Failed to load report configuration")
}

/// The caller a command acts as: a registered user with --as, else the local admin
pub fn acting_caller(db: &Database, as_user: Option<&str>) -> Result<Caller> {
    match as_user {
        None => Ok(Caller::local_admin()),
        Some(username) => match db.get_user_by_username(username)? {
            Some(user) => Ok(Caller::new(user.username, user.role)),
            None => bail!("Unknown user '{}'. Register it with 'ecart users add'", username),
        },
    }
}

/// Resolve a centre argument given as an id or an exact name
pub fn resolve_centre(db: &Database, arg: &str) -> Result<Centre> {
    let found = match arg.parse::<i64>() {
        Ok(id) => db.get_centre(id)?,
        Err(_) => db.find_centre_by_name(arg)?,
    };
    found.with_context(|| format!("Centre not found: {}", arg))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a responsable: ecart responsables add --nom Alaoui --prenom Sara");
    println!("  2. Add centres and budgets: ecart centres add Finance --responsable 1");
    println!("  3. Import expenses: ecart expenses import --file expenses.csv");
    println!("  4. Start the API: ecart serve");

    Ok(())
}
