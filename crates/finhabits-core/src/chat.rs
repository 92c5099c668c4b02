//! Financial advisor chat
//!
//! Answers free-form questions with the user's last 90 days of income,
//! spending and habits as context.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::Period;
use crate::ai::{AIBackend, AIClient};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Expense, HabitSummary, Income};
use crate::money::Money;

/// How far back the advisor looks
pub const CONTEXT_DAYS: i64 = 90;

const RECENT_EXPENSES: usize = 10;
const RECENT_INCOME: usize = 5;

pub const NOT_CONFIGURED_REPLY: &str = "I'm sorry, but AI features are not configured. \
     Please set up your GEMINI_API_KEY to enable personalized financial advice.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub is_relevant: bool,
}

/// Snapshot of a user's recent finances, rendered into the advisor prompt
#[derive(Debug, Clone)]
pub struct AdvisorContext {
    pub today: NaiveDate,
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_balance: Money,
    pub income_count: usize,
    pub expense_count: usize,
    /// Spending per category, largest first
    pub categories: Vec<(String, Money)>,
    pub recent_expenses: Vec<Expense>,
    pub recent_income: Vec<Income>,
    pub habits: Vec<HabitSummary>,
}

impl AdvisorContext {
    pub fn build(db: &Database, user_id: i64, today: NaiveDate) -> Result<Self> {
        let window = Period::new(today - Duration::days(CONTEXT_DAYS), today)?;

        let expenses = db.list_expenses_in(user_id, &window)?;
        let income = db.list_income_in(user_id, &window)?;
        let habits = db.habit_summaries(user_id, Some(window.start))?;

        let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();
        let total_income: Money = income.iter().map(|i| i.amount).sum();

        let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
        for expense in &expenses {
            *by_category.entry(expense.category.clone()).or_default() += expense.amount;
        }
        let mut categories: Vec<(String, Money)> = by_category.into_iter().collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            today,
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
            income_count: income.len(),
            expense_count: expenses.len(),
            categories,
            recent_expenses: expenses.into_iter().take(RECENT_EXPENSES).collect(),
            recent_income: income.into_iter().take(RECENT_INCOME).collect(),
            habits,
        })
    }

    /// Plain-text block placed ahead of the question
    pub fn render(&self) -> String {
        let mut out = String::from("USER'S FINANCIAL DATA (Last 3 months):\n\n");

        out.push_str("INCOME:\n");
        let _ = writeln!(out, "- Total Income: ₹{}", self.total_income);
        let _ = writeln!(out, "- Number of income entries: {}", self.income_count);
        for income in &self.recent_income {
            let _ = writeln!(
                out,
                "  - {}: ₹{} on {}",
                income.source, income.amount, income.date
            );
        }
        if self.income_count > RECENT_INCOME {
            let _ = writeln!(
                out,
                "  ... and {} more entries",
                self.income_count - RECENT_INCOME
            );
        }

        out.push_str("\nEXPENSES:\n");
        let _ = writeln!(out, "- Total Expenses: ₹{}", self.total_expenses);
        let balance_note = if self.net_balance > Money::ZERO {
            "(Positive - Saving money!)"
        } else {
            "(Negative - Spending more than earning)"
        };
        let _ = writeln!(out, "- Net Balance: ₹{} {}", self.net_balance, balance_note);
        let _ = writeln!(out, "- Number of expense entries: {}", self.expense_count);

        out.push_str("\nSPENDING BY CATEGORY:\n");
        for (category, amount) in &self.categories {
            let _ = writeln!(
                out,
                "  - {}: ₹{} ({:.1}%)",
                category,
                amount,
                amount.percent_of(self.total_expenses)
            );
        }

        out.push_str("\nRECENT EXPENSES:\n");
        for expense in &self.recent_expenses {
            let _ = writeln!(
                out,
                "  - {}: ₹{} on {} ({})",
                expense.category, expense.amount, expense.date, expense.description
            );
        }
        if self.expense_count > RECENT_EXPENSES {
            let _ = writeln!(
                out,
                "  ... and {} more expenses",
                self.expense_count - RECENT_EXPENSES
            );
        }

        out.push_str("\nHABITS:\n");
        if self.habits.is_empty() {
            out.push_str("  No habits tracked yet\n");
        }
        for habit in &self.habits {
            let _ = writeln!(
                out,
                "  - {}: {} days completed out of {} tracked",
                habit.name, habit.completed_days, habit.tracked_days
            );
        }

        let _ = write!(out, "\nCurrent Date: {}", self.today.format("%Y-%m-%d"));
        out
    }
}

/// Answer `message` for the user. AI errors are returned to the caller.
pub async fn answer(
    db: &Database,
    ai: Option<&AIClient>,
    user_id: i64,
    message: &str,
    today: NaiveDate,
) -> Result<ChatReply> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::InvalidData("Message is required".to_string()));
    }

    let Some(ai) = ai else {
        return Ok(ChatReply {
            response: NOT_CONFIGURED_REPLY.to_string(),
            is_relevant: false,
        });
    };

    let context = AdvisorContext::build(db, user_id, today)?;
    debug!(
        user_id,
        expenses = context.expense_count,
        income = context.income_count,
        "Asking advisor"
    );
    let response = ai.answer_question(&context.render(), message).await?;

    Ok(ChatReply {
        response,
        is_relevant: true,
    })
}
