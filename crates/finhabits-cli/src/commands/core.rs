//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_user_add` - Create an account

use std::path::Path;

use anyhow::{Context, Result};
use finhabits_core::db::Database;

/// Open (or create) the database, bringing the schema up to date
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account: finhabits user add --username NAME --email EMAIL --password PW");
    println!("     or load sample data: finhabits demo");
    println!("  2. Start web UI: finhabits serve");

    Ok(())
}

pub fn cmd_user_add(db: &Database, username: &str, email: &str, password: &str) -> Result<()> {
    let user = db
        .create_user(username, email, password)
        .context("Failed to create user")?;
    let habits = db.list_habits(user.id)?;

    println!("✅ Created user {} <{}> (id {})", user.username, user.email, user.id);
    println!(
        "   Default habits: {}",
        habits
            .iter()
            .map(|h| h.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
