//! Data export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};

use finhabits_core::export::{export_user_data, write_expenses_csv, UserExport};

use crate::{current_user, AppError, AppState};

/// GET /api/export/full - Everything the user owns as JSON
pub async fn export_full(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<UserExport>, AppError> {
    let user = current_user(&request)?;
    Ok(Json(export_user_data(&state.db, user.id)?))
}

/// GET /api/export/expenses.csv - Expenses as a CSV download
pub async fn export_expenses_csv(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let user = current_user(&request)?;

    let expenses = state.db.list_all_expenses(user.id)?;
    let mut csv = Vec::new();
    write_expenses_csv(&expenses, &mut csv)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"finhabits-expenses-{}.csv\"",
                crate::today().format("%Y-%m-%d")
            ),
        )
        .body(Body::from(csv))
        .map_err(AppError::from)
}
