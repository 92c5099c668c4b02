//! Income handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::Deserialize;

use finhabits_core::models::{Income, NewIncome};
use finhabits_core::Money;

use super::{date_or_today, parse_date, read_json, reject_future, DateQuery, Scope};
use crate::{current_user, AppError, AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct IncomeRequest {
    pub amount: Option<Money>,
    pub source: Option<String>,
    pub date: Option<String>,
}

impl IncomeRequest {
    fn required(&self) -> Result<(Money, &str), AppError> {
        match (self.amount, self.source.as_deref()) {
            (Some(amount), Some(source)) if !source.trim().is_empty() => Ok((amount, source)),
            _ => Err(AppError::bad_request("Amount and source are required")),
        }
    }
}

/// GET /api/income - Income for `?date=` (default today) or `?month=`
pub async fn list_income(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
    request: Request,
) -> Result<Json<Vec<Income>>, AppError> {
    let user = current_user(&request)?;

    let income = match query.scope()? {
        Scope::Day(date) => state.db.list_income_on(user.id, date)?,
        Scope::Month(period) => state.db.list_income_in(user.id, &period)?,
    };

    Ok(Json(income))
}

/// GET /api/income/all
pub async fn list_all_income(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Income>>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.list_all_income(user.id)?))
}

/// POST /api/income
pub async fn create_income(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    let req: IncomeRequest = read_json(request).await?;

    let (amount, source) = req.required()?;
    let date = date_or_today(req.date.as_deref())?;
    reject_future(date, "Cannot add income for future dates")?;

    let id = state.db.add_income(
        user.id,
        &NewIncome {
            amount,
            source: source.to_string(),
            date,
        },
    )?;

    Ok(Json(MessageResponse::with_id("Income added", id)))
}

/// PUT /api/income/:id
pub async fn update_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    let req: IncomeRequest = read_json(request).await?;

    let existing = state
        .db
        .get_income(user.id, id)?
        .ok_or_else(|| AppError::not_found("Income not found or unauthorized"))?;

    let (amount, source) = req.required()?;
    let date = match req.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => existing.date,
    };
    reject_future(date, "Cannot set income for future dates")?;

    state.db.update_income(
        user.id,
        id,
        &NewIncome {
            amount,
            source: source.to_string(),
            date,
        },
    )?;

    Ok(Json(MessageResponse::new("Income updated")))
}

/// DELETE /api/income/:id
pub async fn delete_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    state.db.delete_income(user.id, id)?;
    Ok(Json(MessageResponse::new("Income deleted")))
}
