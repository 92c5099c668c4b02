//! Export of a user's data
//!
//! Supports:
//! - Full JSON export of expenses, income, habit logs and savings
//! - Expense CSV export

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Expense, HabitLog, Income, Saving, User};

/// Everything a user owns, as one JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserExport {
    pub exported_at: DateTime<Utc>,
    pub user: User,
    pub expenses: Vec<Expense>,
    pub income: Vec<Income>,
    pub habit_logs: Vec<HabitLog>,
    pub savings: Vec<Saving>,
}

pub fn export_user_data(db: &Database, user_id: i64) -> Result<UserExport> {
    let user = db
        .get_user(user_id)?
        .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))?;

    let export = UserExport {
        exported_at: Utc::now(),
        user,
        expenses: db.list_all_expenses(user_id)?,
        income: db.list_all_income(user_id)?,
        habit_logs: db.list_all_habit_logs(user_id)?,
        savings: db.list_savings(user_id)?,
    };

    debug!(
        user_id,
        expenses = export.expenses.len(),
        income = export.income.len(),
        habit_logs = export.habit_logs.len(),
        savings = export.savings.len(),
        "Exported user data"
    );
    Ok(export)
}

/// Write expenses as CSV with a header row
pub fn write_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["date", "category", "amount", "description"])?;
    for expense in expenses {
        csv.write_record([
            expense.date.format("%Y-%m-%d").to_string(),
            expense.category.clone(),
            expense.amount.to_string(),
            expense.description.clone(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
