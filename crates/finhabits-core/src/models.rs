//! Domain models for FinHabits

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A registered user (the password hash never leaves the db layer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: Money,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

/// A stored income entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    pub user_id: i64,
    pub amount: Money,
    pub source: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing an income entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncome {
    pub amount: Money,
    pub source: String,
    pub date: NaiveDate,
}

/// A habit owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// False for the habits seeded at signup
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
}

/// One day's log for a habit, joined with the habit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub duration_minutes: i64,
    pub time_slots: String,
    pub topic: String,
    pub tasks: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

fn default_completed() -> bool {
    true
}

/// Input for logging a habit; logging the same (habit, date) twice replaces the earlier entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHabitLog {
    pub habit_id: i64,
    pub date: NaiveDate,
    #[serde(default = "default_completed")]
    pub completed: bool,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub time_slots: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tasks: String,
    #[serde(default)]
    pub notes: String,
}

impl NewHabitLog {
    /// A bare completion with no detail fields
    pub fn completed(habit_id: i64, date: NaiveDate) -> Self {
        Self {
            habit_id,
            date,
            completed: true,
            duration_minutes: 0,
            time_slots: String::new(),
            topic: String::new(),
            tasks: String::new(),
            notes: String::new(),
        }
    }
}

/// An amount put aside towards an optional goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saving {
    pub id: i64,
    pub user_id: i64,
    pub amount: Money,
    pub goal: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSaving {
    pub amount: Money,
    #[serde(default)]
    pub goal: Option<String>,
    pub date: NaiveDate,
}

/// Completion state of one habit on one day, as consumed by the streak calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompletionRecord {
    pub habit_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
}

/// A dated amount with a grouping label (expense category or income source)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryRecord {
    pub amount: Money,
    pub category: String,
    pub date: NaiveDate,
}

impl MonetaryRecord {
    pub fn new(amount: Money, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount,
            category: category.into(),
            date,
        }
    }
}

impl From<&Expense> for MonetaryRecord {
    fn from(expense: &Expense) -> Self {
        Self::new(expense.amount, expense.category.clone(), expense.date)
    }
}

impl From<&Income> for MonetaryRecord {
    fn from(income: &Income) -> Self {
        Self::new(income.amount, income.source.clone(), income.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub habit_id: i64,
    pub current_streak: u32,
}

/// Streak for display, carrying the habit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStreak {
    pub habit_id: i64,
    pub habit_name: String,
    pub current_streak: u32,
}

/// Completed vs tracked days for a habit over a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub name: String,
    pub completed_days: u32,
    pub tracked_days: u32,
}

/// Quick stats for the dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayStats {
    pub today_spending: Money,
    pub month_spending: Money,
    pub month_income: Money,
    /// Days this month on which every habit was completed
    #[serde(rename = "habits_completed_today")]
    pub habits_completed_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeStats {
    pub total_expenses: Money,
    pub total_income: Money,
    pub total_habit_logs: u32,
    pub current_streak: u32,
    pub account_created: Option<DateTime<Utc>>,
}

/// Per-day totals for a calendar month, keyed `YYYY-MM-DD`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub expenses: std::collections::BTreeMap<String, Money>,
    pub habits: std::collections::BTreeMap<String, u32>,
}
