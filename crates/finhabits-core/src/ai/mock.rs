//! Mock backend for testing
//!
//! Produces narratives computed from the prompt numbers, so results are
//! deterministic. Useful for tests and for running the app without an API key.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::money::Money;

use super::types::{InsightNarrative, InsightPrompt};
use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Make every generation call fail
    pub failing: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            failing: false,
        }
    }

    /// A backend whose generation calls all error
    pub fn failing() -> Self {
        Self {
            healthy: false,
            failing: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(Error::Ai("Mock backend configured to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate_insights(&self, prompt: &InsightPrompt) -> Result<InsightNarrative> {
        self.check()?;

        let current = &prompt.comparison.current;
        let previous = &prompt.comparison.previous;

        let summary = format!(
            "In {} you earned ₹{} and spent ₹{}, leaving a balance of ₹{}.",
            current.month, current.total_income, current.total_expenses, current.net_balance
        );

        let delta = prompt.comparison.expense_delta;
        let comparison = if delta.is_zero() {
            format!("Spending matched {} exactly.", previous.month)
        } else if delta.is_negative() {
            format!("You spent ₹{} less than in {}.", delta.abs(), previous.month)
        } else {
            format!("You spent ₹{} more than in {}.", delta, previous.month)
        };

        let top = current
            .category_spending
            .iter()
            .max_by_key(|(_, amount)| **amount)
            .map(|(name, _)| name.as_str());

        let mut suggestions = Vec::new();
        match top {
            Some(category) => {
                suggestions.push(format!("Set a weekly limit for {} spending", category))
            }
            None => suggestions.push("Start logging every expense, even small ones".to_string()),
        }
        if current.net_balance > Money::ZERO {
            suggestions.push("Move part of this month's surplus into savings".to_string());
        } else {
            suggestions.push("Review recurring costs to bring spending under income".to_string());
        }
        let weakest = prompt.habits.iter().min_by_key(|h| h.completed_days);
        match weakest {
            Some(habit) => suggestions.push(format!("Schedule a fixed time for {}", habit.name)),
            None => suggestions.push("Pick one small daily habit to track".to_string()),
        }

        Ok(InsightNarrative {
            summary,
            comparison,
            suggestions,
        })
    }

    async fn answer_question(&self, context: &str, question: &str) -> Result<String> {
        self.check()?;
        Ok(format!(
            "(mock advisor) You asked: \"{}\". I looked at {} lines of your financial data.",
            question.trim(),
            context.lines().filter(|l| !l.trim().is_empty()).count()
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
