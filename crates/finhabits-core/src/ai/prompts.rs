//! Prompt templates

use std::fmt::Write;

use crate::money::Money;

use super::types::InsightPrompt;

/// Instruction prepended to insight requests so the reply is machine-readable
pub const INSIGHT_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"summary": "2-3 encouraging sentences about the month",
 "comparison": "1-2 sentences comparing with the previous month",
 "suggestions": ["three", "specific", "actionable suggestions"]}"#;

fn rupees(amount: Money) -> String {
    format!("₹{}", amount)
}

/// Monthly insight request built from the comparison and habit summaries
pub fn insight_prompt(prompt: &InsightPrompt) -> String {
    let current = &prompt.comparison.current;
    let previous = &prompt.comparison.previous;

    let mut out = String::new();
    out.push_str(
        "You are a friendly financial advisor helping a student understand their spending habits.\n\n",
    );

    let _ = writeln!(out, "Current Month ({}):", current.month);
    let _ = writeln!(out, "- Total Income: {}", rupees(current.total_income));
    let _ = writeln!(out, "- Total Expenses: {}", rupees(current.total_expenses));
    let _ = writeln!(out, "- Net Balance: {}", rupees(current.net_balance));

    out.push_str("\nCategory Breakdown:\n");
    if current.category_spending.is_empty() {
        out.push_str("- No expenses recorded\n");
    }
    for (category, amount) in &current.category_spending {
        let _ = writeln!(out, "- {}: {}", category, rupees(*amount));
    }

    out.push_str("\nHabits Tracked:\n");
    if prompt.habits.is_empty() {
        out.push_str("- No habits tracked\n");
    }
    for habit in &prompt.habits {
        let _ = writeln!(out, "- {}: {} days completed", habit.name, habit.completed_days);
    }

    let _ = writeln!(out, "\nPrevious Month ({}):", previous.month);
    let _ = writeln!(out, "- Total Income: {}", rupees(previous.total_income));
    let _ = writeln!(out, "- Total Expenses: {}", rupees(previous.total_expenses));

    out.push_str(
        "\nKeep the tone friendly, supportive, and student-focused. Don't make predictions about \
         future spending or provide financial guarantees. Focus on practical advice based on the \
         data shown.\n\n",
    );
    out.push_str(INSIGHT_FORMAT);
    out
}

/// Advisor chat request: the rendered user context followed by the question
pub fn advisor_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a personal financial advisor chatbot helping a user manage their finances.\n\n\
         {context}\n\n\
         Based on this data, answer the user's question with specific, personalized advice. \
         Use actual numbers from their data. Be friendly, supportive, and actionable.\n\n\
         User's Question: {question}\n\n\
         Your Response:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compare_months;
    use crate::models::{HabitSummary, MonetaryRecord};
    use chrono::NaiveDate;

    #[test]
    fn test_insight_prompt_contains_figures() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let expenses = vec![MonetaryRecord::new(Money::from_minor(12345), "food", date)];
        let prompt = InsightPrompt {
            comparison: compare_months(2024, 3, &expenses, &[]).unwrap(),
            habits: vec![HabitSummary {
                name: "Study".to_string(),
                completed_days: 12,
                tracked_days: 15,
            }],
        };

        let text = insight_prompt(&prompt);
        assert!(text.contains("Current Month (2024-03)"));
        assert!(text.contains("- food: ₹123.45"));
        assert!(text.contains("- Study: 12 days completed"));
        assert!(text.contains("Previous Month (2024-02)"));
        assert!(text.ends_with(INSIGHT_FORMAT));
    }

    #[test]
    fn test_advisor_prompt() {
        let text = advisor_prompt("INCOME: none", "How do I save?");
        assert!(text.contains("INCOME: none"));
        assert!(text.contains("User's Question: How do I save?"));
    }
}
