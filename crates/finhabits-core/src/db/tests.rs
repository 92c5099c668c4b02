//! Database tests

use chrono::{Duration, NaiveDate, Utc};

use super::*;
use crate::aggregate::Period;
use crate::error::Error;
use crate::models::*;
use crate::money::Money;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> (Database, User) {
    let db = Database::in_memory().unwrap();
    let user = db
        .create_user("alice", "alice@example.com", "hunter22")
        .unwrap();
    (db, user)
}

fn expense(amount: &str, category: &str, date: &str) -> NewExpense {
    NewExpense {
        amount: amount.parse().unwrap(),
        category: category.to_string(),
        description: String::new(),
        date: day(date),
    }
}

fn income(amount: &str, source: &str, date: &str) -> NewIncome {
    NewIncome {
        amount: amount.parse().unwrap(),
        source: source.to_string(),
        date: day(date),
    }
}

#[test]
fn test_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('users', 'sessions', 'expenses', 'income', 'habits', 'habit_logs', 'savings')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 7);
}

#[test]
fn test_create_user_seeds_default_habits() {
    let (db, user) = setup();
    assert_eq!(user.username, "alice");

    let habits = db.list_habits(user.id).unwrap();
    let names: Vec<&str> = habits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, DEFAULT_HABITS.to_vec());
    assert!(habits.iter().all(|h| !h.is_custom));
}

#[test]
fn test_duplicate_email_conflicts() {
    let (db, _) = setup();
    let err = db
        .create_user("alice2", "Alice@Example.com ", "pw")
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn test_create_user_requires_fields() {
    let db = Database::in_memory().unwrap();
    assert!(matches!(
        db.create_user("", "a@b.c", "pw").unwrap_err(),
        Error::InvalidData(_)
    ));
    assert!(matches!(
        db.create_user("bob", "a@b.c", "").unwrap_err(),
        Error::InvalidData(_)
    ));
}

#[test]
fn test_authenticate() {
    let (db, user) = setup();

    let found = db.authenticate("alice@example.com", "hunter22").unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    assert!(db.authenticate("alice@example.com", "wrong").unwrap().is_none());
    assert!(db.authenticate("nobody@example.com", "hunter22").unwrap().is_none());

    // Stored hash is a PHC string, never the password
    let conn = db.conn().unwrap();
    let stored: String = conn
        .query_row("SELECT password_hash FROM users WHERE id = ?", [user.id], |row| {
            row.get(0)
        })
        .unwrap();
    assert!(stored.starts_with("$argon2id$"));
}

#[test]
fn test_sessions() {
    let (db, user) = setup();
    let token = db.create_session(user.id, Duration::hours(1)).unwrap();

    let now = Utc::now();
    assert_eq!(db.session_user(&token, now).unwrap().map(|u| u.id), Some(user.id));
    assert!(db.session_user("not-a-token", now).unwrap().is_none());

    // Expired by the time `now` moves past the ttl
    let later = now + Duration::hours(2);
    assert!(db.session_user(&token, later).unwrap().is_none());
    assert_eq!(db.purge_expired_sessions(later).unwrap(), 1);

    let token = db.create_session(user.id, Duration::hours(1)).unwrap();
    assert!(db.delete_session(&token).unwrap());
    assert!(!db.delete_session(&token).unwrap());
    assert!(db.session_user(&token, now).unwrap().is_none());
}

#[test]
fn test_session_token_is_not_stored_in_clear() {
    let (db, user) = setup();
    let token = db.create_session(user.id, Duration::hours(1)).unwrap();
    let conn = db.conn().unwrap();
    let stored: String = conn
        .query_row("SELECT token_hash FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_ne!(stored, token);
    assert_eq!(stored.len(), 64);
}

#[test]
fn test_expense_crud() {
    let (db, user) = setup();

    let id = db.add_expense(user.id, &expense("12.50", "food", "2024-03-01")).unwrap();
    let stored = db.get_expense(user.id, id).unwrap().unwrap();
    assert_eq!(stored.amount, Money::from_minor(1250));
    assert_eq!(stored.category, "food");
    assert_eq!(stored.date, day("2024-03-01"));

    db.update_expense(user.id, id, &expense("20", "transport", "2024-03-02"))
        .unwrap();
    let stored = db.get_expense(user.id, id).unwrap().unwrap();
    assert_eq!(stored.amount, Money::from_major(20));
    assert_eq!(stored.category, "transport");

    db.delete_expense(user.id, id).unwrap();
    assert!(db.get_expense(user.id, id).unwrap().is_none());
    assert!(matches!(
        db.delete_expense(user.id, id).unwrap_err(),
        Error::NotFound(_)
    ));
}

#[test]
fn test_expense_ownership() {
    let (db, alice) = setup();
    let bob = db.create_user("bob", "bob@example.com", "pw").unwrap();

    let id = db.add_expense(alice.id, &expense("5", "food", "2024-03-01")).unwrap();

    assert!(db.get_expense(bob.id, id).unwrap().is_none());
    assert!(matches!(
        db.update_expense(bob.id, id, &expense("1", "x", "2024-03-01"))
            .unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        db.delete_expense(bob.id, id).unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(db.list_all_expenses(bob.id).unwrap().is_empty());
    assert_eq!(db.list_all_expenses(alice.id).unwrap().len(), 1);
}

#[test]
fn test_expense_validation() {
    let (db, user) = setup();
    assert!(matches!(
        db.add_expense(user.id, &expense("-1", "food", "2024-03-01"))
            .unwrap_err(),
        Error::InvalidData(_)
    ));
    assert!(matches!(
        db.add_expense(user.id, &expense("1", "  ", "2024-03-01"))
            .unwrap_err(),
        Error::InvalidData(_)
    ));
}

#[test]
fn test_amounts_above_max_rejected() {
    let (db, user) = setup();
    let too_much = Money::MAX + Money::from_minor(1);

    let id = db
        .add_expense(user.id, &expense("1", "food", "2024-03-01"))
        .unwrap();
    let oversized = NewExpense {
        amount: too_much,
        ..expense("1", "food", "2024-03-01")
    };
    assert!(matches!(
        db.add_expense(user.id, &oversized).unwrap_err(),
        Error::InvalidData(_)
    ));
    assert!(matches!(
        db.update_expense(user.id, id, &oversized).unwrap_err(),
        Error::InvalidData(_)
    ));
    assert!(matches!(
        db.add_income(
            user.id,
            &NewIncome {
                amount: too_much,
                ..income("1", "Allowance", "2024-03-01")
            }
        )
        .unwrap_err(),
        Error::InvalidData(_)
    ));
    assert!(matches!(
        db.add_saving(
            user.id,
            &NewSaving {
                amount: too_much,
                goal: None,
                date: day("2024-03-01"),
            }
        )
        .unwrap_err(),
        Error::InvalidData(_)
    ));

    db.add_expense(
        user.id,
        &NewExpense {
            amount: Money::MAX,
            ..expense("1", "rent", "2024-03-02")
        },
    )
    .unwrap();
    assert_eq!(db.list_all_expenses(user.id).unwrap().len(), 2);
}

#[test]
fn test_expense_listing() {
    let (db, user) = setup();
    db.add_expense(user.id, &expense("1", "a", "2024-02-29")).unwrap();
    db.add_expense(user.id, &expense("2", "a", "2024-03-01")).unwrap();
    db.add_expense(user.id, &expense("3", "b", "2024-03-01")).unwrap();
    db.add_expense(user.id, &expense("4", "a", "2024-03-31")).unwrap();

    let on_day = db.list_expenses_on(user.id, day("2024-03-01")).unwrap();
    assert_eq!(on_day.len(), 2);
    // Newest entry first
    assert_eq!(on_day[0].amount, Money::from_major(3));

    let march = db
        .list_expenses_in(user.id, &Period::month(2024, 3).unwrap())
        .unwrap();
    assert_eq!(march.len(), 3);
    assert_eq!(march[0].date, day("2024-03-31"));

    assert_eq!(db.list_all_expenses(user.id).unwrap().len(), 4);
}

#[test]
fn test_income_crud() {
    let (db, user) = setup();
    let id = db.add_income(user.id, &income("5000", "Allowance", "2024-03-01")).unwrap();

    let listed = db.list_income_on(user.id, day("2024-03-01")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].source, "Allowance");

    db.update_income(user.id, id, &income("5200", "Allowance", "2024-03-02"))
        .unwrap();
    let stored = db.get_income(user.id, id).unwrap().unwrap();
    assert_eq!(stored.amount, Money::from_major(5200));
    assert_eq!(stored.date, day("2024-03-02"));

    let other = db.create_user("bob", "bob@example.com", "pw").unwrap();
    assert!(matches!(
        db.delete_income(other.id, id).unwrap_err(),
        Error::NotFound(_)
    ));
    db.delete_income(user.id, id).unwrap();
    assert!(db.list_all_income(user.id).unwrap().is_empty());
}

#[test]
fn test_log_habit_upserts() {
    let (db, user) = setup();
    let habit = db.list_habits(user.id).unwrap()[0].clone();

    let first = db
        .log_habit(user.id, &NewHabitLog::completed(habit.id, day("2024-03-01")))
        .unwrap();
    let mut detailed = NewHabitLog::completed(habit.id, day("2024-03-01"));
    detailed.completed = false;
    detailed.duration_minutes = 45;
    detailed.topic = "Ownership".to_string();
    let second = db.log_habit(user.id, &detailed).unwrap();
    assert_eq!(first, second);

    let logs = db.list_habit_logs_on(user.id, day("2024-03-01")).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].name, habit.name);
    assert!(!logs[0].completed);
    assert_eq!(logs[0].duration_minutes, 45);
    assert_eq!(logs[0].topic, "Ownership");
}

#[test]
fn test_log_habit_rejects_foreign_habit() {
    let (db, alice) = setup();
    let bob = db.create_user("bob", "bob@example.com", "pw").unwrap();
    let alice_habit = db.list_habits(alice.id).unwrap()[0].id;

    let err = db
        .log_habit(bob.id, &NewHabitLog::completed(alice_habit, day("2024-03-01")))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_create_custom_habit() {
    let (db, user) = setup();
    let id = db.create_habit(user.id, "Reading", true).unwrap();
    let habit = db.get_habit(user.id, id).unwrap().unwrap();
    assert!(habit.is_custom);
    assert_eq!(db.list_habits(user.id).unwrap().len(), 4);
    assert!(db.create_habit(user.id, " ", true).is_err());
}

#[test]
fn test_habit_streaks() {
    let (db, user) = setup();
    let today = day("2024-03-15");
    let habits = db.list_habits(user.id).unwrap();

    // Study: today, yesterday, day before
    for n in 0..3 {
        db.log_habit(
            user.id,
            &NewHabitLog::completed(habits[0].id, today - Duration::days(n)),
        )
        .unwrap();
    }
    // Coding: yesterday only
    db.log_habit(
        user.id,
        &NewHabitLog::completed(habits[1].id, today - Duration::days(1)),
    )
    .unwrap();
    // Exercise: logged as not done today
    let mut skipped = NewHabitLog::completed(habits[2].id, today);
    skipped.completed = false;
    db.log_habit(user.id, &skipped).unwrap();

    let streaks = db.habit_streaks(user.id, today).unwrap();
    let by_name: Vec<(&str, u32)> = streaks
        .iter()
        .map(|s| (s.habit_name.as_str(), s.current_streak))
        .collect();
    assert_eq!(by_name, vec![("Study", 3), ("Coding", 1), ("Exercise", 0)]);
}

#[test]
fn test_habit_summaries() {
    let (db, user) = setup();
    let habits = db.list_habits(user.id).unwrap();

    db.log_habit(user.id, &NewHabitLog::completed(habits[0].id, day("2024-02-20")))
        .unwrap();
    db.log_habit(user.id, &NewHabitLog::completed(habits[0].id, day("2024-03-02")))
        .unwrap();
    let mut missed = NewHabitLog::completed(habits[0].id, day("2024-03-03"));
    missed.completed = false;
    db.log_habit(user.id, &missed).unwrap();

    let all = db.habit_summaries(user.id, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].completed_days, 2);
    assert_eq!(all[0].tracked_days, 3);
    assert_eq!(all[1].tracked_days, 0);

    let since = db.habit_summaries(user.id, Some(day("2024-03-01"))).unwrap();
    assert_eq!(since[0].completed_days, 1);
    assert_eq!(since[0].tracked_days, 2);

    let feb = db
        .habit_summaries_in(user.id, &Period::month(2024, 2).unwrap())
        .unwrap();
    assert_eq!(feb[0].completed_days, 1);
}

#[test]
fn test_savings() {
    let (db, user) = setup();
    db.add_saving(
        user.id,
        &NewSaving {
            amount: Money::from_major(200),
            goal: Some("Laptop".to_string()),
            date: day("2024-03-01"),
        },
    )
    .unwrap();
    let id = db
        .add_saving(
            user.id,
            &NewSaving {
                amount: Money::from_minor(5050),
                goal: Some("  ".to_string()),
                date: day("2024-03-05"),
            },
        )
        .unwrap();

    let savings = db.list_savings(user.id).unwrap();
    assert_eq!(savings.len(), 2);
    assert_eq!(savings[0].goal, None);
    assert_eq!(savings[1].goal.as_deref(), Some("Laptop"));
    assert_eq!(db.total_savings(user.id).unwrap(), Money::from_minor(25050));

    db.delete_saving(user.id, id).unwrap();
    assert_eq!(db.total_savings(user.id).unwrap(), Money::from_major(200));
    assert!(db.delete_saving(user.id, id).is_err());
}

#[test]
fn test_today_stats() {
    let (db, user) = setup();
    let today = day("2024-03-15");

    db.add_expense(user.id, &expense("10.10", "food", "2024-03-15")).unwrap();
    db.add_expense(user.id, &expense("5", "food", "2024-03-01")).unwrap();
    db.add_expense(user.id, &expense("99", "food", "2024-02-28")).unwrap();
    db.add_income(user.id, &income("100", "Allowance", "2024-03-01")).unwrap();

    let habits = db.list_habits(user.id).unwrap();
    // All three habits on the 10th, two of three on the 11th
    for habit in &habits {
        db.log_habit(user.id, &NewHabitLog::completed(habit.id, day("2024-03-10")))
            .unwrap();
    }
    for habit in &habits[..2] {
        db.log_habit(user.id, &NewHabitLog::completed(habit.id, day("2024-03-11")))
            .unwrap();
    }

    let stats = db.today_stats(user.id, today).unwrap();
    assert_eq!(stats.today_spending, Money::from_minor(1010));
    assert_eq!(stats.month_spending, Money::from_minor(1510));
    assert_eq!(stats.month_income, Money::from_major(100));
    assert_eq!(stats.habits_completed_days, 1);
}

#[test]
fn test_today_stats_without_habits() {
    let db = Database::in_memory().unwrap();
    let user = db.create_user("carol", "carol@example.com", "pw").unwrap();
    let conn = db.conn().unwrap();
    conn.execute("DELETE FROM habits WHERE user_id = ?", [user.id])
        .unwrap();
    drop(conn);

    let stats = db.today_stats(user.id, day("2024-03-15")).unwrap();
    assert_eq!(stats.habits_completed_days, 0);
    assert_eq!(stats.today_spending, Money::ZERO);
}

#[test]
fn test_all_time_stats() {
    let (db, user) = setup();
    let today = day("2024-03-15");
    db.add_expense(user.id, &expense("10", "food", "2023-01-01")).unwrap();
    db.add_expense(user.id, &expense("0.05", "food", "2024-03-01")).unwrap();
    db.add_income(user.id, &income("7", "Gift", "2024-01-01")).unwrap();

    let habit = db.list_habits(user.id).unwrap()[0].id;
    for n in 1..5 {
        db.log_habit(user.id, &NewHabitLog::completed(habit, today - Duration::days(n)))
            .unwrap();
    }

    let stats = db.all_time_stats(user.id, today).unwrap();
    assert_eq!(stats.total_expenses, Money::from_minor(1005));
    assert_eq!(stats.total_income, Money::from_major(7));
    assert_eq!(stats.total_habit_logs, 4);
    assert_eq!(stats.current_streak, 4);
    assert!(stats.account_created.is_some());
}

#[test]
fn test_calendar() {
    let (db, user) = setup();
    db.add_expense(user.id, &expense("10", "food", "2024-03-01")).unwrap();
    db.add_expense(user.id, &expense("2.5", "bus", "2024-03-01")).unwrap();
    db.add_expense(user.id, &expense("7", "food", "2024-04-01")).unwrap();

    let habits = db.list_habits(user.id).unwrap();
    db.log_habit(user.id, &NewHabitLog::completed(habits[0].id, day("2024-03-02")))
        .unwrap();
    db.log_habit(user.id, &NewHabitLog::completed(habits[1].id, day("2024-03-02")))
        .unwrap();

    let cal = db.calendar(user.id, 2024, 3).unwrap();
    assert_eq!(cal.expenses.len(), 1);
    assert_eq!(cal.expenses["2024-03-01"], Money::from_minor(1250));
    assert_eq!(cal.habits["2024-03-02"], 2);

    assert!(db.calendar(user.id, 2024, 13).is_err());
}

#[test]
fn test_monthly_comparison() {
    let (db, user) = setup();
    db.add_expense(user.id, &expense("100", "food", "2024-01-10")).unwrap();
    db.add_expense(user.id, &expense("60", "food", "2023-12-02")).unwrap();
    db.add_expense(user.id, &expense("999", "food", "2023-11-30")).unwrap();
    db.add_income(user.id, &income("500", "Allowance", "2024-01-01")).unwrap();

    let cmp = db.monthly_comparison(user.id, 2024, 1).unwrap();
    assert_eq!(cmp.current.total_expenses, Money::from_major(100));
    assert_eq!(cmp.previous.total_expenses, Money::from_major(60));
    assert_eq!(cmp.expense_delta, Money::from_major(40));
    assert_eq!(cmp.income_delta, Money::from_major(500));
    assert_eq!(cmp.previous.period, Period::month(2023, 12).unwrap());
}

#[test]
fn test_delete_user_removes_everything() {
    let (db, user) = setup();
    db.add_expense(user.id, &expense("1", "a", "2024-03-01")).unwrap();
    db.create_session(user.id, Duration::hours(1)).unwrap();
    db.delete_user(user.id).unwrap();

    assert!(db.get_user(user.id).unwrap().is_none());
    assert!(db.list_all_expenses(user.id).unwrap().is_empty());
    assert!(db.list_habits(user.id).unwrap().is_empty());
}
