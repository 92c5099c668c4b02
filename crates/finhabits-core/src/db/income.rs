//! Income CRUD

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{date_column, date_param, parse_datetime, Database};
use crate::aggregate::Period;
use crate::error::{Error, Result};
use crate::models::{Income, NewIncome};
use crate::money::Money;

const INCOME_COLUMNS: &str = "id, user_id, amount_minor, source, date, created_at";

fn validate(income: &NewIncome) -> Result<()> {
    income.amount.validate_amount()?;
    if income.source.trim().is_empty() {
        return Err(Error::InvalidData("Source is required".to_string()));
    }
    Ok(())
}

fn not_found() -> Error {
    Error::NotFound("Income not found or unauthorized".to_string())
}

pub(crate) fn insert_income(conn: &Connection, user_id: i64, income: &NewIncome) -> Result<i64> {
    validate(income)?;
    conn.execute(
        "INSERT INTO income (user_id, amount_minor, source, date) VALUES (?, ?, ?, ?)",
        params![
            user_id,
            income.amount.minor(),
            income.source.trim(),
            date_param(income.date),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    pub fn add_income(&self, user_id: i64, income: &NewIncome) -> Result<i64> {
        let conn = self.conn()?;
        insert_income(&conn, user_id, income)
    }

    pub fn get_income(&self, user_id: i64, id: i64) -> Result<Option<Income>> {
        let conn = self.conn()?;
        let income = conn
            .query_row(
                &format!(
                    "SELECT {} FROM income WHERE id = ? AND user_id = ?",
                    INCOME_COLUMNS
                ),
                params![id, user_id],
                |row| Self::row_to_income(row),
            )
            .optional()?;
        Ok(income)
    }

    pub fn update_income(&self, user_id: i64, id: i64, income: &NewIncome) -> Result<()> {
        validate(income)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE income SET amount_minor = ?, source = ?, date = ? WHERE id = ? AND user_id = ?",
            params![
                income.amount.minor(),
                income.source.trim(),
                date_param(income.date),
                id,
                user_id,
            ],
        )?;
        if updated == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    pub fn delete_income(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM income WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    pub fn list_income_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<Income>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM income WHERE user_id = ? AND date = ? ORDER BY id DESC",
            INCOME_COLUMNS
        ))?;
        let income = stmt
            .query_map(params![user_id, date_param(date)], |row| {
                Self::row_to_income(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(income)
    }

    pub fn list_income_in(&self, user_id: i64, period: &Period) -> Result<Vec<Income>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM income
             WHERE user_id = ? AND date BETWEEN ? AND ?
             ORDER BY date DESC, id DESC",
            INCOME_COLUMNS
        ))?;
        let income = stmt
            .query_map(
                params![user_id, date_param(period.start), date_param(period.end)],
                |row| Self::row_to_income(row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(income)
    }

    pub fn list_all_income(&self, user_id: i64) -> Result<Vec<Income>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM income WHERE user_id = ? ORDER BY date DESC, id DESC",
            INCOME_COLUMNS
        ))?;
        let income = stmt
            .query_map(params![user_id], |row| Self::row_to_income(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(income)
    }

    pub(crate) fn row_to_income(row: &rusqlite::Row) -> rusqlite::Result<Income> {
        let created_at_str: String = row.get(5)?;
        Ok(Income {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: Money::from_minor(row.get(2)?),
            source: row.get(3)?,
            date: date_column(row, 4)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
