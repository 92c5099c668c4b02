//! Demo data command

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use finhabits_core::db::Database;
use finhabits_core::demo::{seed_demo_data, DemoOptions};

use super::today;

fn parse_day(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
}

/// Resolve the demo range from optional `--start`/`--end` flags
pub fn demo_options(start: Option<&str>, end: Option<&str>) -> Result<DemoOptions> {
    let end = match end {
        Some(value) => parse_day(value, "end")?,
        None => today(),
    };
    let mut options = DemoOptions::ending(end);
    if let Some(value) = start {
        options.start = parse_day(value, "start")?;
    }
    if options.start > options.end {
        anyhow::bail!(
            "--start {} is after --end {}",
            options.start,
            options.end
        );
    }
    Ok(options)
}

pub fn cmd_demo(db: &Database, options: &DemoOptions) -> Result<()> {
    let days = (options.end - options.start + Duration::days(1)).num_days();
    println!(
        "🎲 Generating {} days of demo data ({} to {})...",
        days, options.start, options.end
    );

    let summary = seed_demo_data(db, options).context("Failed to seed demo data")?;

    println!("✅ Demo data ready!");
    println!("   Habits:     {}", summary.habits);
    println!("   Expenses:   {}", summary.expenses);
    println!("   Income:     {}", summary.income);
    println!("   Habit logs: {}", summary.habit_logs);
    println!();
    println!("Log in with:");
    println!("   Email:    {}", options.email);
    println!("   Password: {}", options.password);

    Ok(())
}
