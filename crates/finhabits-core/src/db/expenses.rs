//! Expense CRUD
//!
//! Every query is scoped by `user_id`; rows belonging to someone else behave
//! exactly like rows that do not exist.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{date_column, date_param, parse_datetime, Database};
use crate::aggregate::Period;
use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};
use crate::money::Money;

const EXPENSE_COLUMNS: &str = "id, user_id, amount_minor, category, description, date, created_at";

fn validate(expense: &NewExpense) -> Result<()> {
    expense.amount.validate_amount()?;
    if expense.category.trim().is_empty() {
        return Err(Error::InvalidData("Category is required".to_string()));
    }
    Ok(())
}

fn not_found() -> Error {
    Error::NotFound("Expense not found or unauthorized".to_string())
}

pub(crate) fn insert_expense(conn: &Connection, user_id: i64, expense: &NewExpense) -> Result<i64> {
    validate(expense)?;
    conn.execute(
        "INSERT INTO expenses (user_id, amount_minor, category, description, date)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user_id,
            expense.amount.minor(),
            expense.category.trim(),
            expense.description,
            date_param(expense.date),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    pub fn add_expense(&self, user_id: i64, expense: &NewExpense) -> Result<i64> {
        let conn = self.conn()?;
        insert_expense(&conn, user_id, expense)
    }

    pub fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses WHERE id = ? AND user_id = ?",
                    EXPENSE_COLUMNS
                ),
                params![id, user_id],
                |row| Self::row_to_expense(row),
            )
            .optional()?;
        Ok(expense)
    }

    /// Replace all fields of an expense
    pub fn update_expense(&self, user_id: i64, id: i64, expense: &NewExpense) -> Result<()> {
        validate(expense)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE expenses SET amount_minor = ?, category = ?, description = ?, date = ?
             WHERE id = ? AND user_id = ?",
            params![
                expense.amount.minor(),
                expense.category.trim(),
                expense.description,
                date_param(expense.date),
                id,
                user_id,
            ],
        )?;
        if updated == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    /// Expenses on one day, newest entry first
    pub fn list_expenses_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_id = ? AND date = ? ORDER BY id DESC",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![user_id, date_param(date)], |row| {
                Self::row_to_expense(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Expenses within the period, date descending
    pub fn list_expenses_in(&self, user_id: i64, period: &Period) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses
             WHERE user_id = ? AND date BETWEEN ? AND ?
             ORDER BY date DESC, id DESC",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(
                params![user_id, date_param(period.start), date_param(period.end)],
                |row| Self::row_to_expense(row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    pub fn list_all_expenses(&self, user_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_id = ? ORDER BY date DESC, id DESC",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![user_id], |row| Self::row_to_expense(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Column order: id, user_id, amount_minor, category, description, date, created_at
    pub(crate) fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
        let created_at_str: String = row.get(6)?;
        Ok(Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: Money::from_minor(row.get(2)?),
            category: row.get(3)?,
            description: row.get(4)?,
            date: date_column(row, 5)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
