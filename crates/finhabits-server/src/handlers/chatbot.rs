//! Financial advisor chat

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use finhabits_core::chat::{self, ChatReply};
use finhabits_core::Error as CoreError;

use super::read_json;
use crate::{current_user, today, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /api/chatbot - Ask the advisor a question about your finances
pub async fn chatbot(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let user = current_user(&request)?;
    let req: ChatRequest = read_json(request).await?;

    if req.message.trim().is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }

    match chat::answer(&state.db, state.ai.as_ref(), user.id, &req.message, today()).await {
        Ok(reply) => Ok(Json(reply).into_response()),
        Err(e @ (CoreError::Ai(_) | CoreError::Http(_) | CoreError::Json(_))) => {
            warn!(user_id = user.id, error = %e, "Advisor request failed");
            let reply = ChatReply {
                response: format!("I apologize, but I encountered an error: {}", e),
                is_relevant: false,
            };
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(reply)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
