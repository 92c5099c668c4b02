//! Habit and habit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::Deserialize;

use finhabits_core::models::{Habit, HabitLog, HabitStreak, NewHabitLog};

use super::{date_or_today, read_json, reject_future, DateQuery, Scope};
use crate::{current_user, today, AppError, AppState, MessageResponse, SuccessResponse};

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    #[serde(default)]
    pub name: String,
}

/// Request body for logging a habit. Detail fields are optional.
#[derive(Debug, Deserialize)]
pub struct HabitLogRequest {
    pub habit_id: i64,
    pub date: Option<String>,
    pub completed: Option<bool>,
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

/// GET /api/habits
pub async fn list_habits(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Habit>>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.list_habits(user.id)?))
}

/// POST /api/habits - Add a custom habit
pub async fn create_habit(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    let req: CreateHabitRequest = read_json(request).await?;

    let id = state.db.create_habit(user.id, &req.name, true)?;

    Ok(Json(MessageResponse::with_id("Habit added", id)))
}

/// GET /api/habits/log - Logs for `?date=` (default today) or `?month=`
pub async fn list_habit_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
    request: Request,
) -> Result<Json<Vec<HabitLog>>, AppError> {
    let user = current_user(&request)?;

    let logs = match query.scope()? {
        Scope::Day(date) => state.db.list_habit_logs_on(user.id, date)?,
        Scope::Month(period) => state.db.list_habit_logs_in(user.id, &period)?,
    };

    Ok(Json(logs))
}

/// GET /api/habits/log/all
pub async fn list_all_habit_logs(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<HabitLog>>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.list_all_habit_logs(user.id)?))
}

/// POST /api/habits/log - Log a habit for a day (replaces that day's log)
pub async fn log_habit(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user = current_user(&request)?;
    let req: HabitLogRequest = read_json(request).await?;

    let date = date_or_today(req.date.as_deref())?;
    reject_future(date, "Cannot log habits for future dates")?;

    state.db.log_habit(
        user.id,
        &NewHabitLog {
            habit_id: req.habit_id,
            date,
            completed: req.completed.unwrap_or(true),
            duration_minutes: req.duration_minutes,
            time_slots: req.time_slots,
            topic: req.topic,
            tasks: req.tasks,
            notes: req.notes,
        },
    )?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/streaks - Current streak per habit
pub async fn get_streaks(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<HabitStreak>>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.habit_streaks(user.id, today())?))
}
