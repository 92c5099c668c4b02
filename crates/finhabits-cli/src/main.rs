//! FinHabits CLI - Spending and habit tracker for students
//!
//! Usage:
//!   finhabits init                       Initialize database
//!   finhabits user add --email ...       Create an account
//!   finhabits demo                       Seed the demo account
//!   finhabits serve --port 3000          Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finhabits_core::config::AppConfig;

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

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    let db_path = config.database.path.clone();

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            commands::cmd_serve(&config).await
        }
        Commands::Demo { start, end } => {
            let db = commands::open_db(&db_path)?;
            let options = commands::demo_options(start.as_deref(), end.as_deref())?;
            commands::cmd_demo(&db, &options)
        }
        Commands::Streaks { email } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_streaks(&db, &email, commands::today())
        }
        Commands::Report { email, month, json } => {
            let db = commands::open_db(&db_path)?;
            let (year, month) = commands::resolve_month(month.as_deref(), commands::today())?;
            commands::cmd_report(&db, &email, year, month, json)
        }
        Commands::AiTest => commands::cmd_ai_test(&config.ai).await,
        Commands::User { action } => {
            let db = commands::open_db(&db_path)?;
            match action {
                UserAction::Add {
                    username,
                    email,
                    password,
                } => commands::cmd_user_add(&db, &username, &email, &password),
            }
        }
    }
}
