//! Integration tests for finhabits-core
//!
//! These tests exercise the record → stats → insights → export workflow
//! through the public API only.

use chrono::{Duration, NaiveDate};
use finhabits_core::{
    aggregate_period, compute_streak,
    config::AppConfig,
    db::Database,
    generate_monthly_insights,
    models::{MonetaryRecord, NewExpense, NewHabitLog, NewIncome},
    AIClient, AiBackendKind, InsightSource, Money,
};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn expense(amount: &str, category: &str, date: &str) -> NewExpense {
    NewExpense {
        amount: amount.parse().unwrap(),
        category: category.to_string(),
        description: String::new(),
        date: day(date),
    }
}

// =============================================================================
// Pure core
// =============================================================================

#[test]
fn test_streak_example_scenarios() {
    let today = day("2024-06-15");
    let yesterday = today - Duration::days(1);

    assert_eq!(
        compute_streak(&[today, yesterday, today - Duration::days(2)], today),
        3
    );
    assert_eq!(compute_streak(&[today - Duration::days(2)], today), 0);
    assert_eq!(compute_streak(&[yesterday], today), 1);
    assert_eq!(compute_streak(&[], today), 0);
}

#[test]
fn test_unbroken_run_of_n_days() {
    let today = day("2024-03-02");
    for n in 1..=40u32 {
        let dates: Vec<NaiveDate> = (0..n)
            .map(|i| today - Duration::days(i64::from(i)))
            .collect();
        assert_eq!(compute_streak(&dates, today), n);
    }
}

#[test]
fn test_aggregate_example_scenario() {
    let d1 = day("2024-02-01");
    let d2 = day("2024-02-02");
    let records = vec![
        MonetaryRecord::new(Money::from_major(50), "food", d1),
        MonetaryRecord::new(Money::from_major(30), "food", d2),
        MonetaryRecord::new(Money::from_major(20), "transport", d1),
    ];

    let summary = aggregate_period(&records, d1, d2);
    assert_eq!(summary.total, Money::from_major(100));
    assert_eq!(summary.by_category["food"], Money::from_major(80));
    assert_eq!(summary.by_category["transport"], Money::from_major(20));
    assert_eq!(summary.by_category.values().copied().sum::<Money>(), summary.total);

    let mut reversed = records.clone();
    reversed.reverse();
    assert_eq!(aggregate_period(&reversed, d1, d2), summary);
}

#[test]
fn test_cents_do_not_drift() {
    let date = day("2024-02-01");
    let records: Vec<MonetaryRecord> = (0..1000)
        .map(|_| MonetaryRecord::new("0.10".parse().unwrap(), "food", date))
        .collect();
    let summary = aggregate_period(&records, date, date);
    assert_eq!(summary.total, Money::from_major(100));
}

// =============================================================================
// Database workflow
// =============================================================================

#[test]
fn test_full_tracking_workflow() {
    let db = Database::in_memory().expect("Failed to create database");
    let user = db
        .create_user("Priya", "priya@example.com", "pa55word")
        .expect("Failed to create user");

    // Expenses across two months
    db.add_expense(user.id, &expense("250", "food", "2024-04-10")).unwrap();
    db.add_expense(user.id, &expense("120.50", "transport", "2024-05-02")).unwrap();
    db.add_expense(user.id, &expense("79.50", "food", "2024-05-03")).unwrap();
    db.add_income(
        user.id,
        &NewIncome {
            amount: Money::from_major(5000),
            source: "Monthly Allowance".to_string(),
            date: day("2024-05-01"),
        },
    )
    .unwrap();

    // Three days of every habit, ending today
    let today = day("2024-05-03");
    let habits = db.list_habits(user.id).unwrap();
    assert_eq!(habits.len(), 3);
    for habit in &habits {
        for offset in 0..3 {
            db.log_habit(
                user.id,
                &NewHabitLog::completed(habit.id, today - Duration::days(offset)),
            )
            .unwrap();
        }
    }

    let streaks = db.habit_streaks(user.id, today).unwrap();
    assert!(streaks.iter().all(|s| s.current_streak == 3));

    let stats = db.today_stats(user.id, today).unwrap();
    assert_eq!(stats.today_spending, "79.50".parse().unwrap());
    assert_eq!(stats.month_spending, Money::from_major(200));
    assert_eq!(stats.month_income, Money::from_major(5000));
    assert_eq!(stats.habits_completed_days, 3);

    let all_time = db.all_time_stats(user.id, today).unwrap();
    assert_eq!(all_time.total_expenses, Money::from_major(450));
    assert_eq!(all_time.total_habit_logs, 9);
    assert_eq!(all_time.current_streak, 3);

    let calendar = db.calendar(user.id, 2024, 5).unwrap();
    assert_eq!(calendar.expenses["2024-05-02"], "120.50".parse().unwrap());
    assert_eq!(calendar.habits["2024-05-03"], 3);

    let comparison = db.monthly_comparison(user.id, 2024, 5).unwrap();
    assert_eq!(comparison.current.total_expenses, Money::from_major(200));
    assert_eq!(comparison.previous.total_expenses, Money::from_major(250));
    assert_eq!(comparison.expense_delta, Money::from_major(-50));
    assert_eq!(comparison.current.net_balance, Money::from_major(4800));

    let export = finhabits_core::export_user_data(&db, user.id).unwrap();
    assert_eq!(export.expenses.len(), 3);
    assert_eq!(export.habit_logs.len(), 9);
}

#[test]
fn test_january_compares_with_december() {
    let db = Database::in_memory().unwrap();
    let user = db.create_user("Sam", "sam@example.com", "pw").unwrap();
    db.add_expense(user.id, &expense("10", "food", "2023-12-31")).unwrap();
    db.add_expense(user.id, &expense("20", "food", "2024-01-01")).unwrap();

    let comparison = db.monthly_comparison(user.id, 2024, 1).unwrap();
    assert_eq!(comparison.previous.month, "2023-12");
    assert_eq!(comparison.previous.total_expenses, Money::from_major(10));
    assert_eq!(comparison.current.total_expenses, Money::from_major(20));
}

// =============================================================================
// Insights with configured clients
// =============================================================================

#[tokio::test]
async fn test_insights_with_mock_backend_from_config() {
    let config = AppConfig::from_toml_str("[ai]\nbackend = \"mock\"\n").unwrap();
    assert_eq!(config.ai.backend, AiBackendKind::Mock);
    let ai = AIClient::from_config(&config.ai).expect("mock backend should be configured");

    let db = Database::in_memory().unwrap();
    let user = db.create_user("Lee", "lee@example.com", "pw").unwrap();
    db.add_expense(user.id, &expense("300", "education", "2024-05-05")).unwrap();

    let insights = generate_monthly_insights(&db, Some(&ai), user.id, 2024, 5)
        .await
        .unwrap();
    assert_eq!(insights.source, InsightSource::Ai);
    assert_eq!(insights.current_stats.total_expenses, Money::from_major(300));
    assert!(insights.suggestions[0].contains("education"));
}

#[tokio::test]
async fn test_unreachable_backend_falls_back() {
    let ai = AIClient::Gemini(finhabits_core::GeminiBackend::new(
        "http://127.0.0.1:9",
        "gemini-test",
        "key",
    ));

    let db = Database::in_memory().unwrap();
    let user = db.create_user("Kim", "kim@example.com", "pw").unwrap();
    db.add_expense(user.id, &expense("40", "food", "2024-05-05")).unwrap();

    let insights = generate_monthly_insights(&db, Some(&ai), user.id, 2024, 5)
        .await
        .unwrap();
    assert_eq!(insights.source, InsightSource::Fallback);
    assert!(insights.summary.starts_with("This month you spent ₹40.00"));
    assert_eq!(insights.suggestions.len(), 3);
}
