//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database setup (init, user add) and shared utilities (open_db)
//! - `serve` - Web server command
//! - `demo` - Demo account seeding
//! - `reports` - Streak and monthly comparison reports
//! - `ai` - AI backend connectivity test

pub mod ai;
pub mod core;
pub mod demo;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use ai::*;
pub use core::*;
pub use demo::*;
pub use reports::*;
pub use serve::*;

use chrono::{Local, NaiveDate};

/// Today in local time, matching the server
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
