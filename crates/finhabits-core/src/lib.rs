//! FinHabits Core Library
//!
//! Shared functionality for the FinHabits spending and habit tracker:
//! - Exact money arithmetic in minor units
//! - Streak calculation over habit completion dates
//! - Period aggregation of expenses and income
//! - SQLite persistence with connection pooling
//! - Pluggable AI backends (Gemini, OpenAI-compatible, mock)
//! - Monthly insights and the financial advisor chat
//! - Demo data seeding and user data export

pub mod aggregate;
pub mod ai;
pub mod chat;
pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;
pub mod money;
pub mod streak;

/// Test utilities including a mock AI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    aggregate, aggregate_period, compare_months, daily_totals, MonthComparison, MonthlyStats,
    Period, PeriodSummary,
};
pub use ai::{AIBackend, AIClient, GeminiBackend, MockBackend, OpenAICompatibleBackend};
pub use chat::{AdvisorContext, ChatReply};
pub use config::{AiBackendKind, AiConfig, AppConfig, DatabaseConfig, ServerSettings};
pub use db::Database;
pub use demo::{seed_demo_data, DemoOptions, DemoSummary};
pub use error::{Error, Result};
pub use export::{export_user_data, write_expenses_csv, UserExport};
pub use insights::{generate_monthly_insights, InsightPrompt, InsightSource, MonthlyInsights};
pub use money::Money;
pub use streak::{compute_streak, compute_streak_from_records, longest_current_streak, streak_result};
