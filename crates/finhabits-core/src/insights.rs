//! Monthly insights
//!
//! Combines the month-over-month comparison with habit summaries and asks the
//! configured AI backend for a short narrative. The numbers are always
//! returned; only the prose depends on the AI.
//!
//! - No AI client: a "not configured" summary and no suggestions
//! - AI error: a fallback narrative computed from the totals
//! - Partial AI output: missing fields are taken from the fallback

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::{MonthComparison, MonthlyStats};
use crate::ai::{AIBackend, AIClient, InsightNarrative};
use crate::db::Database;
use crate::error::{Error, Result};

pub use crate::ai::InsightPrompt;

pub const NOT_CONFIGURED_SUMMARY: &str =
    "AI insights are not configured. Please add your GEMINI_API_KEY to the environment.";

pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Keep tracking your expenses regularly",
    "Try to reduce spending in your highest category",
    "Maintain consistency with your habits",
];

/// Where the narrative text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Ai,
    Fallback,
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyInsights {
    pub summary: String,
    pub comparison: Option<String>,
    pub suggestions: Vec<String>,
    pub current_stats: MonthlyStats,
    pub previous_stats: MonthlyStats,
    pub source: InsightSource,
}

/// Narrative built only from the numbers
fn fallback_narrative(comparison: &MonthComparison) -> InsightNarrative {
    let current = &comparison.current;
    InsightNarrative {
        summary: format!(
            "This month you spent ₹{} and earned ₹{}. Your net balance is ₹{}.",
            current.total_expenses, current.total_income, current.net_balance
        ),
        comparison: format!(
            "Last month you spent ₹{}. This month: ₹{}",
            comparison.previous.total_expenses, current.total_expenses
        ),
        suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Fill empty fields of `narrative` from `fallback`
fn merge_narrative(narrative: InsightNarrative, fallback: InsightNarrative) -> InsightNarrative {
    InsightNarrative {
        summary: if narrative.summary.trim().is_empty() {
            fallback.summary
        } else {
            narrative.summary
        },
        comparison: if narrative.comparison.trim().is_empty() {
            fallback.comparison
        } else {
            narrative.comparison
        },
        suggestions: if narrative.suggestions.is_empty() {
            fallback.suggestions
        } else {
            narrative.suggestions
        },
    }
}

/// Insights for `year-month` compared with the month before it
pub async fn generate_monthly_insights(
    db: &Database,
    ai: Option<&AIClient>,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<MonthlyInsights> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidData(format!("Invalid month: {}", month)));
    }

    let comparison = db.monthly_comparison(user_id, year, month)?;

    let Some(ai) = ai else {
        debug!(user_id, "No AI backend, returning unconfigured insights");
        return Ok(MonthlyInsights {
            summary: NOT_CONFIGURED_SUMMARY.to_string(),
            comparison: None,
            suggestions: Vec::new(),
            current_stats: comparison.current,
            previous_stats: comparison.previous,
            source: InsightSource::Unconfigured,
        });
    };

    let habits = db.habit_summaries_in(user_id, &comparison.current.period)?;
    let prompt = InsightPrompt { comparison, habits };
    let fallback = fallback_narrative(&prompt.comparison);

    let (narrative, source) = match ai.generate_insights(&prompt).await {
        Ok(narrative) => (merge_narrative(narrative, fallback), InsightSource::Ai),
        Err(e) => {
            warn!(user_id, error = %e, model = %ai.model(), "AI insight generation failed");
            (fallback, InsightSource::Fallback)
        }
    };

    let InsightPrompt { comparison, .. } = prompt;
    Ok(MonthlyInsights {
        summary: narrative.summary,
        comparison: Some(narrative.comparison),
        suggestions: narrative.suggestions,
        current_stats: comparison.current,
        previous_stats: comparison.previous,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{NewExpense, NewIncome};
    use crate::money::Money;
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("bob", "bob@example.com", "secret").unwrap();

        for (amount, category, date) in [
            (200, "food", "2024-03-04"),
            (100, "transport", "2024-03-10"),
            (450, "food", "2024-02-12"),
        ] {
            db.add_expense(
                user.id,
                &NewExpense {
                    amount: Money::from_major(amount),
                    category: category.to_string(),
                    description: String::new(),
                    date: day(date),
                },
            )
            .unwrap();
        }
        db.add_income(
            user.id,
            &NewIncome {
                amount: Money::from_major(5000),
                source: "Monthly Allowance".to_string(),
                date: day("2024-03-01"),
            },
        )
        .unwrap();

        (db, user.id)
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let (db, user_id) = setup();
        let insights = generate_monthly_insights(&db, None, user_id, 2024, 3)
            .await
            .unwrap();

        assert_eq!(insights.source, InsightSource::Unconfigured);
        assert_eq!(insights.summary, NOT_CONFIGURED_SUMMARY);
        assert!(insights.comparison.is_none());
        assert!(insights.suggestions.is_empty());
        assert_eq!(insights.current_stats.total_expenses, Money::from_major(300));
        assert_eq!(insights.previous_stats.total_expenses, Money::from_major(450));
    }

    #[tokio::test]
    async fn test_ai_narrative() {
        let (db, user_id) = setup();
        let ai = AIClient::mock();
        let insights = generate_monthly_insights(&db, Some(&ai), user_id, 2024, 3)
            .await
            .unwrap();

        assert_eq!(insights.source, InsightSource::Ai);
        assert!(insights.summary.contains("₹5000.00"));
        assert_eq!(
            insights.comparison.as_deref(),
            Some("You spent ₹150.00 less than in 2024-02.")
        );
        assert_eq!(insights.suggestions.len(), 3);
    }

    #[tokio::test]
    async fn test_ai_failure_falls_back() {
        let (db, user_id) = setup();
        let ai = AIClient::Mock(MockBackend::failing());
        let insights = generate_monthly_insights(&db, Some(&ai), user_id, 2024, 3)
            .await
            .unwrap();

        assert_eq!(insights.source, InsightSource::Fallback);
        assert_eq!(
            insights.summary,
            "This month you spent ₹300.00 and earned ₹5000.00. Your net balance is ₹4700.00."
        );
        assert_eq!(
            insights.comparison.as_deref(),
            Some("Last month you spent ₹450.00. This month: ₹300.00")
        );
        assert_eq!(insights.suggestions, FALLBACK_SUGGESTIONS.to_vec());
    }

    #[tokio::test]
    async fn test_invalid_month() {
        let (db, user_id) = setup();
        let err = generate_monthly_insights(&db, None, user_id, 2024, 13)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_merge_fills_empty_fields() {
        let fallback = InsightNarrative {
            summary: "fallback summary".to_string(),
            comparison: "fallback comparison".to_string(),
            suggestions: vec!["a".to_string()],
        };
        let partial = InsightNarrative {
            summary: "ai summary".to_string(),
            comparison: "  ".to_string(),
            suggestions: vec![],
        };
        let merged = merge_narrative(partial, fallback);
        assert_eq!(merged.summary, "ai summary");
        assert_eq!(merged.comparison, "fallback comparison");
        assert_eq!(merged.suggestions, vec!["a"]);
    }
}
