//! Savings handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use finhabits_core::models::{NewSaving, Saving};
use finhabits_core::Money;

use super::{date_or_today, read_json, reject_future};
use crate::{current_user, AppError, AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct SavingRequest {
    pub amount: Option<Money>,
    pub goal: Option<String>,
    pub date: Option<String>,
}

/// Savings entries with their running total
#[derive(Debug, Serialize)]
pub struct SavingsResponse {
    pub savings: Vec<Saving>,
    pub total: Money,
}

/// GET /api/savings
pub async fn list_savings(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SavingsResponse>, AppError> {
    let user = current_user(&request)?;

    Ok(Json(SavingsResponse {
        savings: state.db.list_savings(user.id)?,
        total: state.db.total_savings(user.id)?,
    }))
}

/// POST /api/savings
pub async fn create_saving(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    let req: SavingRequest = read_json(request).await?;

    let amount = req
        .amount
        .ok_or_else(|| AppError::bad_request("Amount is required"))?;
    let date = date_or_today(req.date.as_deref())?;
    reject_future(date, "Cannot add savings for future dates")?;

    let goal = req
        .goal
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());
    let id = state
        .db
        .add_saving(user.id, &NewSaving { amount, goal, date })?;

    Ok(Json(MessageResponse::with_id("Saving added", id)))
}

/// DELETE /api/savings/:id
pub async fn delete_saving(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    state.db.delete_saving(user.id, id)?;
    Ok(Json(MessageResponse::new("Saving deleted")))
}
