//! Monthly AI insights

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};

use finhabits_core::insights::{generate_monthly_insights, MonthlyInsights};

use crate::{current_user, AppError, AppState};

/// GET /api/insights/:year/:month
///
/// Always answers with the month's numbers. The narrative comes from the AI
/// backend when one is configured and reachable, otherwise from the numbers.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
    request: Request,
) -> Result<Json<MonthlyInsights>, AppError> {
    let user = current_user(&request)?;

    let insights =
        generate_monthly_insights(&state.db, state.ai.as_ref(), user.id, year, month).await?;

    Ok(Json(insights))
}
