//! Dashboard statistics and calendar handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};

use finhabits_core::aggregate::MonthComparison;
use finhabits_core::models::{AllTimeStats, CalendarMonth, TodayStats};

use crate::{current_user, today, AppError, AppState};

/// GET /api/calendar/:year/:month - Per-day spending and habit counts
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
    request: Request,
) -> Result<Json<CalendarMonth>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.calendar(user.id, year, month)?))
}

/// GET /api/stats/today
pub async fn get_today_stats(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<TodayStats>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.today_stats(user.id, today())?))
}

/// GET /api/stats/all-time
pub async fn get_all_time_stats(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AllTimeStats>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.all_time_stats(user.id, today())?))
}

/// GET /api/stats/monthly/:year/:month - A month against the one before it
pub async fn get_monthly_comparison(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
    request: Request,
) -> Result<Json<MonthComparison>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.monthly_comparison(user.id, year, month)?))
}
