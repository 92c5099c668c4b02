//! Habits, daily habit logs and streaks

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{date_column, date_param, parse_datetime, Database};
use crate::aggregate::Period;
use crate::error::{Error, Result};
use crate::models::{Habit, HabitCompletionRecord, HabitLog, HabitStreak, HabitSummary, NewHabitLog};
use crate::streak::compute_streak_from_records;

const LOG_SELECT: &str = r#"
    SELECT hl.id, hl.habit_id, hl.user_id, h.name, hl.date, hl.completed,
           hl.duration_minutes, hl.time_slots, hl.topic, hl.tasks, hl.notes, hl.created_at
    FROM habit_logs hl
    JOIN habits h ON hl.habit_id = h.id
"#;

pub(crate) fn insert_habit(conn: &Connection, user_id: i64, name: &str, is_custom: bool) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidData("Habit name is required".to_string()));
    }
    conn.execute(
        "INSERT INTO habits (user_id, name, is_custom) VALUES (?, ?, ?)",
        params![user_id, name, is_custom],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Upsert on (habit, date). The caller has checked that the habit belongs to `user_id`.
pub(crate) fn upsert_habit_log(conn: &Connection, user_id: i64, log: &NewHabitLog) -> Result<i64> {
    if log.duration_minutes < 0 {
        return Err(Error::InvalidData(
            "Duration cannot be negative".to_string(),
        ));
    }

    let date = date_param(log.date);
    conn.execute(
        r#"
        INSERT INTO habit_logs
            (habit_id, user_id, date, completed, duration_minutes, time_slots, topic, tasks, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(habit_id, date) DO UPDATE SET
            completed = excluded.completed,
            duration_minutes = excluded.duration_minutes,
            time_slots = excluded.time_slots,
            topic = excluded.topic,
            tasks = excluded.tasks,
            notes = excluded.notes
        "#,
        params![
            log.habit_id,
            user_id,
            date,
            log.completed,
            log.duration_minutes,
            log.time_slots,
            log.topic,
            log.tasks,
            log.notes,
        ],
    )?;

    let id: i64 = conn.query_row(
        "SELECT id FROM habit_logs WHERE habit_id = ? AND date = ?",
        params![log.habit_id, date],
        |row| row.get(0),
    )?;
    debug!(habit_id = log.habit_id, date = %date, completed = log.completed, "Logged habit");
    Ok(id)
}

impl Database {
    pub fn list_habits(&self, user_id: i64) -> Result<Vec<Habit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, is_custom, created_at FROM habits WHERE user_id = ? ORDER BY id",
        )?;
        let habits = stmt
            .query_map(params![user_id], |row| Self::row_to_habit(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    pub fn create_habit(&self, user_id: i64, name: &str, is_custom: bool) -> Result<i64> {
        let conn = self.conn()?;
        insert_habit(&conn, user_id, name, is_custom)
    }

    pub fn get_habit(&self, user_id: i64, id: i64) -> Result<Option<Habit>> {
        let conn = self.conn()?;
        let habit = conn
            .query_row(
                "SELECT id, user_id, name, is_custom, created_at FROM habits WHERE id = ? AND user_id = ?",
                params![id, user_id],
                |row| Self::row_to_habit(row),
            )
            .optional()?;
        Ok(habit)
    }

    /// Record a habit for a day, replacing any earlier log for that (habit, date)
    pub fn log_habit(&self, user_id: i64, log: &NewHabitLog) -> Result<i64> {
        if self.get_habit(user_id, log.habit_id)?.is_none() {
            return Err(Error::NotFound("Habit not found".to_string()));
        }
        let conn = self.conn()?;
        upsert_habit_log(&conn, user_id, log)
    }

    pub fn list_habit_logs_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<HabitLog>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE hl.user_id = ? AND hl.date = ? ORDER BY hl.habit_id",
            LOG_SELECT
        ))?;
        let logs = stmt
            .query_map(params![user_id, date_param(date)], |row| {
                Self::row_to_habit_log(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    pub fn list_habit_logs_in(&self, user_id: i64, period: &Period) -> Result<Vec<HabitLog>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE hl.user_id = ? AND hl.date BETWEEN ? AND ? ORDER BY hl.date DESC, hl.habit_id",
            LOG_SELECT
        ))?;
        let logs = stmt
            .query_map(
                params![user_id, date_param(period.start), date_param(period.end)],
                |row| Self::row_to_habit_log(row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    pub fn list_all_habit_logs(&self, user_id: i64) -> Result<Vec<HabitLog>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE hl.user_id = ? ORDER BY hl.date DESC, hl.habit_id",
            LOG_SELECT
        ))?;
        let logs = stmt
            .query_map(params![user_id], |row| Self::row_to_habit_log(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Every log row for a habit, newest first
    pub fn habit_completion_records(&self, habit_id: i64) -> Result<Vec<HabitCompletionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT habit_id, date, completed FROM habit_logs WHERE habit_id = ? ORDER BY date DESC",
        )?;
        let records = stmt
            .query_map(params![habit_id], |row| {
                Ok(HabitCompletionRecord {
                    habit_id: row.get(0)?,
                    date: date_column(row, 1)?,
                    completed: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Current streak of each of the user's habits as of `today`
    pub fn habit_streaks(&self, user_id: i64, today: NaiveDate) -> Result<Vec<HabitStreak>> {
        let habits = self.list_habits(user_id)?;
        let mut streaks = Vec::with_capacity(habits.len());
        for habit in habits {
            let records = self.habit_completion_records(habit.id)?;
            streaks.push(HabitStreak {
                habit_id: habit.id,
                habit_name: habit.name,
                current_streak: compute_streak_from_records(&records, today),
            });
        }
        Ok(streaks)
    }

    /// Completed and tracked days per habit for logs on or after `since`
    pub fn habit_summaries(
        &self,
        user_id: i64,
        since: Option<NaiveDate>,
    ) -> Result<Vec<HabitSummary>> {
        self.habit_summaries_between(user_id, since, None)
    }

    /// Completed and tracked days per habit within the period
    pub fn habit_summaries_in(&self, user_id: i64, period: &Period) -> Result<Vec<HabitSummary>> {
        self.habit_summaries_between(user_id, Some(period.start), Some(period.end))
    }

    fn habit_summaries_between(
        &self,
        user_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<HabitSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT h.name,
                   COUNT(CASE WHEN hl.completed = 1 THEN 1 END) AS completed_days,
                   COUNT(hl.id) AS tracked_days
            FROM habits h
            LEFT JOIN habit_logs hl ON h.id = hl.habit_id
                AND (?1 IS NULL OR hl.date >= ?1)
                AND (?2 IS NULL OR hl.date <= ?2)
            WHERE h.user_id = ?3
            GROUP BY h.id, h.name
            ORDER BY h.id
            "#,
        )?;
        let summaries = stmt
            .query_map(
                params![from.map(date_param), to.map(date_param), user_id],
                |row| {
                    Ok(HabitSummary {
                        name: row.get(0)?,
                        completed_days: row.get(1)?,
                        tracked_days: row.get(2)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    fn row_to_habit(row: &rusqlite::Row) -> rusqlite::Result<Habit> {
        let created_at_str: String = row.get(4)?;
        Ok(Habit {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            is_custom: row.get(3)?,
            created_at: parse_datetime(&created_at_str),
        })
    }

    /// Column order follows `LOG_SELECT`
    pub(crate) fn row_to_habit_log(row: &rusqlite::Row) -> rusqlite::Result<HabitLog> {
        let created_at_str: String = row.get(11)?;
        Ok(HabitLog {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            user_id: row.get(2)?,
            name: row.get(3)?,
            date: date_column(row, 4)?,
            completed: row.get(5)?,
            duration_minutes: row.get(6)?,
            time_slots: row.get(7)?,
            topic: row.get(8)?,
            tasks: row.get(9)?,
            notes: row.get(10)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
