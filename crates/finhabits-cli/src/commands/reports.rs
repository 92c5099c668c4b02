//! Report command implementations

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use finhabits_core::aggregate::MonthlyStats;
use finhabits_core::db::Database;
use finhabits_core::models::User;
use finhabits_core::Money;

/// Resolve `--month YYYY-MM` to (year, month), defaulting to the month of `today`
pub fn resolve_month(month: Option<&str>, today: NaiveDate) -> Result<(i32, u32)> {
    let Some(value) = month else {
        return Ok((today.year(), today.month()));
    };

    let parsed = value
        .trim()
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
        .filter(|(_, m)| (1..=12).contains(m));

    parsed.with_context(|| format!("Invalid --month: {} (use YYYY-MM)", value))
}

fn find_user(db: &Database, email: &str) -> Result<User> {
    db.get_user_by_email(email)?
        .with_context(|| format!("No user with email {}", email))
}

pub fn cmd_streaks(db: &Database, email: &str, today: NaiveDate) -> Result<()> {
    let user = find_user(db, email)?;
    let streaks = db.habit_streaks(user.id, today)?;

    if streaks.is_empty() {
        println!("No habits yet.");
        return Ok(());
    }

    println!("🔥 Habit streaks for {} (as of {})", user.username, today);
    println!();
    println!("{:<24} {:>8}", "Habit", "Streak");
    println!("{}", "-".repeat(33));
    for streak in &streaks {
        let days = if streak.current_streak == 1 { "day" } else { "days" };
        println!(
            "{:<24} {:>3} {}",
            streak.habit_name, streak.current_streak, days
        );
    }

    Ok(())
}

fn print_month(stats: &MonthlyStats) {
    println!("   Income:   ₹{:>12}", stats.total_income.to_string());
    println!("   Expenses: ₹{:>12}", stats.total_expenses.to_string());
    println!("   Net:      ₹{:>12}", stats.net_balance.to_string());
}

fn signed(amount: Money) -> String {
    if amount > Money::ZERO {
        format!("+{}", amount)
    } else {
        amount.to_string()
    }
}

pub fn cmd_report(db: &Database, email: &str, year: i32, month: u32, json: bool) -> Result<()> {
    let user = find_user(db, email)?;
    let comparison = db.monthly_comparison(user.id, year, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    let current = &comparison.current;
    let previous = &comparison.previous;

    println!("📊 {} for {}", current.month, user.username);
    print_month(current);
    println!();
    println!("   vs {}", previous.month);
    print_month(previous);
    println!();
    println!("   Change in spending: ₹{}", signed(comparison.expense_delta));
    println!("   Change in income:   ₹{}", signed(comparison.income_delta));

    if !current.category_spending.is_empty() {
        println!();
        println!("{:<20} {:>12} {:>7}", "Category", "Spent", "Share");
        println!("{}", "-".repeat(41));
        let mut categories: Vec<_> = current.category_spending.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (category, amount) in categories {
            println!(
                "{:<20} {:>12} {:>6.1}%",
                category,
                amount.to_string(),
                amount.percent_of(current.total_expenses)
            );
        }
    }

    Ok(())
}
