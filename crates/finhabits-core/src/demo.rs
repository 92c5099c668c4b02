//! Demo data seeding
//!
//! Fills a demo account with a student's worth of expenses, income and habit
//! logs over a date range. Every "random" choice is derived from a SHA-256
//! digest of the date and a slot label, so the same range always produces
//! the same data.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::{
    delete_user_rows, insert_expense, insert_habit, insert_income, insert_user, upsert_habit_log,
    Database,
};
use crate::error::{Error, Result};
use crate::models::{NewExpense, NewHabitLog, NewIncome};
use crate::money::Money;

/// Category, inclusive range in major units, and descriptions
const EXPENSE_CATEGORIES: [(&str, i64, i64, &[&str]); 5] = [
    (
        "food",
        50,
        300,
        &["Breakfast at cafe", "Lunch with friends", "Dinner", "Snacks", "College canteen"],
    ),
    ("transport", 20, 150, &["Bus fare", "Auto to college", "Uber ride", "Bike fuel"]),
    (
        "education",
        100,
        500,
        &["Books", "Course materials", "Online course", "Study materials", "Printing"],
    ),
    (
        "entertainment",
        100,
        400,
        &["Movie tickets", "Gaming", "Concert", "Weekend outing", "Streaming subscription"],
    ),
    (
        "others",
        50,
        250,
        &["Haircut", "Clothes", "Phone recharge", "Stationery", "Gift for friend"],
    ),
];

/// Habit, completion probability, topics
const DEMO_HABITS: [(&str, f64, &[&str]); 5] = [
    ("Study", 0.85, &["Mathematics", "Physics", "Programming", "History", "Chemistry"]),
    ("Exercise", 0.60, &["Gym", "Running", "Yoga", "Cycling", "Swimming"]),
    ("Reading", 0.50, &["Fiction", "Non-fiction", "Technical books", "Articles"]),
    ("Meditation", 0.40, &["Morning meditation", "Evening relaxation"]),
    ("Coding Practice", 0.70, &["LeetCode", "Project work", "Learning new framework"]),
];

const ALLOWANCE: (&str, i64) = ("Monthly Allowance", 5000);
const TUTORING: (&str, i64) = ("Part-time Tutoring", 1500);
const OCCASIONAL_INCOME: [(&str, i64); 2] = [("Freelance Work", 2000), ("Birthday Gift", 1000)];
const OCCASIONAL_CHANCE: f64 = 0.1;
const INCOME_VARIATION: i64 = 200;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl DemoOptions {
    /// Two months of data ending on `end`
    pub fn ending(end: NaiveDate) -> Self {
        Self {
            start: end
                .checked_sub_signed(Duration::days(61))
                .unwrap_or(NaiveDate::MIN),
            end,
            username: "Demo Student".to_string(),
            email: "demo@student.com".to_string(),
            password: "demo123".to_string(),
        }
    }
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self::ending(Utc::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoSummary {
    pub user_id: i64,
    pub habits: usize,
    pub expenses: usize,
    pub income: usize,
    pub habit_logs: usize,
}

/// Deterministic pseudo-random value for a (date, slot) pair
fn roll(date: NaiveDate, slot: &str) -> u64 {
    let digest = Sha256::digest(format!("{}:{}", date, slot).as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Integer in `lo..=hi`
fn pick(date: NaiveDate, slot: &str, lo: i64, hi: i64) -> i64 {
    let span = (hi - lo + 1) as u64;
    lo + (roll(date, slot) % span) as i64
}

fn chance(date: NaiveDate, slot: &str, probability: f64) -> bool {
    (roll(date, slot) % 10_000) < (probability * 10_000.0) as u64
}

fn choose<'a>(date: NaiveDate, slot: &str, items: &[&'a str]) -> &'a str {
    items[pick(date, slot, 0, items.len() as i64 - 1) as usize]
}

fn varied_income(date: NaiveDate, source: &str, base: i64) -> Money {
    let delta = pick(date, &format!("income:{}", source), -INCOME_VARIATION, INCOME_VARIATION);
    Money::from_major(base + delta)
}

/// Replace any existing demo account with freshly generated data.
///
/// Runs in a single transaction: on failure the previous demo account is left
/// untouched.
pub fn seed_demo_data(db: &Database, options: &DemoOptions) -> Result<DemoSummary> {
    if options.start > options.end {
        return Err(Error::InvalidData(format!(
            "Demo start {} is after end {}",
            options.start, options.end
        )));
    }

    let mut conn = db.conn()?;
    let tx = conn.transaction()?;

    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM users WHERE email = ?",
            params![options.email.trim().to_lowercase()],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(existing) = existing {
        info!(user_id = existing, "Removing previous demo data");
        delete_user_rows(&tx, existing)?;
    }

    let user_id = insert_user(&tx, &options.username, &options.email, &options.password)?;
    tx.execute(
        "UPDATE users SET created_at = ? WHERE id = ?",
        params![format!("{} 00:00:00", options.start.format("%Y-%m-%d")), user_id],
    )?;

    // Reuse default habits that share a name, add the rest as custom
    let defaults: Vec<(i64, String)> = {
        let mut stmt = tx.prepare("SELECT id, name FROM habits WHERE user_id = ?")?;
        let rows = stmt
            .query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows
    };
    let mut habit_ids = Vec::with_capacity(DEMO_HABITS.len());
    for (name, probability, topics) in DEMO_HABITS {
        let id = match defaults.iter().find(|(_, existing)| existing == name) {
            Some((id, _)) => *id,
            None => insert_habit(&tx, user_id, name, true)?,
        };
        habit_ids.push((id, name, probability, topics));
    }

    let mut summary = DemoSummary {
        user_id,
        habits: habit_ids.len(),
        expenses: 0,
        income: 0,
        habit_logs: 0,
    };

    for date in options.start.iter_days().take_while(|d| *d <= options.end) {
        let daily = pick(date, "expense-count", 2, 5);
        for slot in 0..daily {
            let index = pick(date, &format!("expense:{}:category", slot), 0, 4) as usize;
            let (category, min, max, descriptions) = EXPENSE_CATEGORIES[index];
            let amount = Money::from_minor(pick(
                date,
                &format!("expense:{}:amount", slot),
                min * 100,
                max * 100,
            ));
            insert_expense(
                &tx,
                user_id,
                &NewExpense {
                    amount,
                    category: category.to_string(),
                    description: choose(date, &format!("expense:{}:desc", slot), descriptions)
                        .to_string(),
                    date,
                },
            )?;
            summary.expenses += 1;
        }

        let mut incomes = Vec::new();
        if date.day() == 1 {
            incomes.push(ALLOWANCE);
        }
        if date.weekday() == Weekday::Sat {
            incomes.push(TUTORING);
        }
        for occasional in OCCASIONAL_INCOME {
            if chance(date, &format!("occasional:{}", occasional.0), OCCASIONAL_CHANCE) {
                incomes.push(occasional);
            }
        }
        for (source, base) in incomes {
            insert_income(
                &tx,
                user_id,
                &NewIncome {
                    amount: varied_income(date, source, base),
                    source: source.to_string(),
                    date,
                },
            )?;
            summary.income += 1;
        }

        for &(habit_id, name, probability, topics) in &habit_ids {
            if !chance(date, &format!("habit:{}", name), probability) {
                continue;
            }
            upsert_habit_log(
                &tx,
                user_id,
                &NewHabitLog {
                    duration_minutes: pick(date, &format!("habit:{}:duration", name), 15, 120),
                    topic: choose(date, &format!("habit:{}:topic", name), topics).to_string(),
                    ..NewHabitLog::completed(habit_id, date)
                },
            )?;
            summary.habit_logs += 1;
        }
    }

    tx.commit()?;

    info!(
        user_id,
        expenses = summary.expenses,
        income = summary.income,
        habit_logs = summary.habit_logs,
        "Seeded demo data"
    );
    Ok(summary)
}
