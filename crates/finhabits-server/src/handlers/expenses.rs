//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::Deserialize;

use finhabits_core::models::{Expense, NewExpense};
use finhabits_core::Money;

use super::{date_or_today, parse_date, read_json, reject_future, DateQuery, Scope};
use crate::{current_user, AppError, AppState, MessageResponse};

/// Request body for creating or replacing an expense
#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub amount: Option<Money>,
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    pub date: Option<String>,
}

impl ExpenseRequest {
    fn required(&self) -> Result<(Money, &str), AppError> {
        match (self.amount, self.category.as_deref()) {
            (Some(amount), Some(category)) if !category.trim().is_empty() => Ok((amount, category)),
            _ => Err(AppError::bad_request("Amount and category are required")),
        }
    }
}

/// GET /api/expenses - Expenses for `?date=` (default today) or `?month=`
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user = current_user(&request)?;

    let expenses = match query.scope()? {
        Scope::Day(date) => state.db.list_expenses_on(user.id, date)?,
        Scope::Month(period) => state.db.list_expenses_in(user.id, &period)?,
    };

    Ok(Json(expenses))
}

/// GET /api/expenses/all - Every expense, newest first
pub async fn list_all_expenses(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(state.db.list_all_expenses(user.id)?))
}

/// POST /api/expenses - Record an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    let req: ExpenseRequest = read_json(request).await?;

    let (amount, category) = req.required()?;
    let date = date_or_today(req.date.as_deref())?;
    reject_future(date, "Cannot add expenses for future dates")?;

    let id = state.db.add_expense(
        user.id,
        &NewExpense {
            amount,
            category: category.to_string(),
            description: req.description.clone(),
            date,
        },
    )?;

    Ok(Json(MessageResponse::with_id("Expense added", id)))
}

/// PUT /api/expenses/:id - Replace an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    let req: ExpenseRequest = read_json(request).await?;

    let existing = state
        .db
        .get_expense(user.id, id)?
        .ok_or_else(|| AppError::not_found("Expense not found or unauthorized"))?;

    let (amount, category) = req.required()?;
    let date = match req.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => existing.date,
    };
    reject_future(date, "Cannot set expenses for future dates")?;

    state.db.update_expense(
        user.id,
        id,
        &NewExpense {
            amount,
            category: category.to_string(),
            description: req.description.clone(),
            date,
        },
    )?;

    Ok(Json(MessageResponse::new("Expense updated")))
}

/// DELETE /api/expenses/:id - Remove an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let user = current_user(&request)?;
    state.db.delete_expense(user.id, id)?;
    Ok(Json(MessageResponse::new("Expense deleted")))
}
