//! Dashboard statistics, calendar data and monthly comparisons

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::params;

use super::{date_param, Database};
use crate::aggregate::{compare_months, daily_totals, MonthComparison, Period};
use crate::error::Result;
use crate::models::{AllTimeStats, CalendarMonth, MonetaryRecord, StreakResult, TodayStats};
use crate::money::Money;
use crate::streak::longest_current_streak;

impl Database {
    /// Figures for the dashboard header as of `today`
    pub fn today_stats(&self, user_id: i64, today: NaiveDate) -> Result<TodayStats> {
        let month = Period::containing(today)?;
        let conn = self.conn()?;

        let today_spending: i64 = conn.query_row(
            "SELECT COALESCE(SUM(amount_minor), 0) FROM expenses WHERE user_id = ? AND date = ?",
            params![user_id, date_param(today)],
            |row| row.get(0),
        )?;
        let month_spending: i64 = conn.query_row(
            "SELECT COALESCE(SUM(amount_minor), 0) FROM expenses
             WHERE user_id = ? AND date BETWEEN ? AND ?",
            params![user_id, date_param(month.start), date_param(month.end)],
            |row| row.get(0),
        )?;
        let month_income: i64 = conn.query_row(
            "SELECT COALESCE(SUM(amount_minor), 0) FROM income
             WHERE user_id = ? AND date BETWEEN ? AND ?",
            params![user_id, date_param(month.start), date_param(month.end)],
            |row| row.get(0),
        )?;

        let habit_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;

        // Days this month on which every habit was completed
        let habits_completed_days: u32 = if habit_count == 0 {
            0
        } else {
            conn.query_row(
                r#"
                SELECT COUNT(*) FROM (
                    SELECT date
                    FROM habit_logs
                    WHERE user_id = ? AND completed = 1 AND date BETWEEN ? AND ?
                    GROUP BY date
                    HAVING COUNT(*) = ?
                )
                "#,
                params![
                    user_id,
                    date_param(month.start),
                    date_param(month.end),
                    habit_count
                ],
                |row| row.get(0),
            )?
        };

        Ok(TodayStats {
            today_spending: Money::from_minor(today_spending),
            month_spending: Money::from_minor(month_spending),
            month_income: Money::from_minor(month_income),
            habits_completed_days,
        })
    }

    pub fn all_time_stats(&self, user_id: i64, today: NaiveDate) -> Result<AllTimeStats> {
        let (total_expenses, total_income, total_habit_logs) = {
            let conn = self.conn()?;
            let expenses: i64 = conn.query_row(
                "SELECT COALESCE(SUM(amount_minor), 0) FROM expenses WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )?;
            let income: i64 = conn.query_row(
                "SELECT COALESCE(SUM(amount_minor), 0) FROM income WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )?;
            let logs: u32 = conn.query_row(
                "SELECT COUNT(*) FROM habit_logs WHERE user_id = ? AND completed = 1",
                params![user_id],
                |row| row.get(0),
            )?;
            (expenses, income, logs)
        };

        let streaks: Vec<StreakResult> = self
            .habit_streaks(user_id, today)?
            .into_iter()
            .map(|s| StreakResult {
                habit_id: s.habit_id,
                current_streak: s.current_streak,
            })
            .collect();

        Ok(AllTimeStats {
            total_expenses: Money::from_minor(total_expenses),
            total_income: Money::from_minor(total_income),
            total_habit_logs,
            current_streak: longest_current_streak(&streaks),
            account_created: self.get_user(user_id)?.map(|u| u.created_at),
        })
    }

    /// Daily expense totals and completed-habit counts for one month
    pub fn calendar(&self, user_id: i64, year: i32, month: u32) -> Result<CalendarMonth> {
        let period = Period::month(year, month)?;

        let records: Vec<MonetaryRecord> = self
            .list_expenses_in(user_id, &period)?
            .iter()
            .map(MonetaryRecord::from)
            .collect();
        let expenses: BTreeMap<String, Money> = daily_totals(&records, &period)
            .into_iter()
            .map(|(date, total)| (date_param(date), total))
            .collect();

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date, COUNT(*) FROM habit_logs
             WHERE user_id = ? AND completed = 1 AND date BETWEEN ? AND ?
             GROUP BY date",
        )?;
        let habits: BTreeMap<String, u32> = stmt
            .query_map(
                params![user_id, date_param(period.start), date_param(period.end)],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
            )?
            .collect::<std::result::Result<_, _>>()?;

        Ok(CalendarMonth { expenses, habits })
    }

    /// `year-month` against the month before it
    pub fn monthly_comparison(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<MonthComparison> {
        let current = Period::month(year, month)?;
        let span = Period::new(current.previous_month()?.start, current.end)?;

        let expenses: Vec<MonetaryRecord> = self
            .list_expenses_in(user_id, &span)?
            .iter()
            .map(MonetaryRecord::from)
            .collect();
        let income: Vec<MonetaryRecord> = self
            .list_income_in(user_id, &span)?
            .iter()
            .map(MonetaryRecord::from)
            .collect();

        compare_months(year, month, &expenses, &income)
    }
}
