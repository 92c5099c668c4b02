//! Savings entries

use rusqlite::params;

use super::{date_column, date_param, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewSaving, Saving};
use crate::money::Money;

impl Database {
    pub fn add_saving(&self, user_id: i64, saving: &NewSaving) -> Result<i64> {
        saving.amount.validate_amount()?;
        let goal = saving
            .goal
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty());

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO savings (user_id, amount_minor, goal, date) VALUES (?, ?, ?, ?)",
            params![user_id, saving.amount.minor(), goal, date_param(saving.date)],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_savings(&self, user_id: i64) -> Result<Vec<Saving>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, amount_minor, goal, date, created_at
             FROM savings WHERE user_id = ? ORDER BY date DESC, id DESC",
        )?;
        let savings = stmt
            .query_map(params![user_id], |row| {
                let created_at_str: String = row.get(5)?;
                Ok(Saving {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    amount: Money::from_minor(row.get(2)?),
                    goal: row.get(3)?,
                    date: date_column(row, 4)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(savings)
    }

    pub fn delete_saving(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM savings WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(
                "Saving not found or unauthorized".to_string(),
            ));
        }
        Ok(())
    }

    pub fn total_savings(&self, user_id: i64) -> Result<Money> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(amount_minor), 0) FROM savings WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(Money::from_minor(total))
    }
}
