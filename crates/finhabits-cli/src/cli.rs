//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinHabits - Track student spending and daily habits
#[derive(Parser)]
#[command(name = "finhabits")]
#[command(about = "Self-hosted spending and habit tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides config file and FINHABITS_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to FINHABITS_CONFIG, then ~/.config/finhabits/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to config, then 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Directory containing the web UI to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Replace the demo account with generated data
    ///
    /// Logs in as demo@student.com / demo123.
    Demo {
        /// First day of data, YYYY-MM-DD (defaults to 61 days before --end)
        #[arg(long)]
        start: Option<String>,

        /// Last day of data, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        end: Option<String>,
    },

    /// Show current habit streaks for a user
    Streaks {
        /// Account email
        #[arg(short, long)]
        email: String,
    },

    /// Compare a month with the month before it
    Report {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Month to report, YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Test the configured AI backend
    AiTest,

    /// User account management
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account (seeded with the default habits)
    Add {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}
