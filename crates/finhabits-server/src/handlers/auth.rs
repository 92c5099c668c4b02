//! Signup, login and session handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use finhabits_core::models::User;

use super::read_json;
use crate::{current_user, session_token, AppError, AppState, MessageResponse, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn session_cookie(state: &AppState, token: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if state.config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/auth/signup - Register a new account
pub async fn signup(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MessageResponse>, AppError> {
    let req: SignupRequest = read_json(request).await?;

    let (Some(username), Some(email), Some(password)) = (
        non_empty(&req.username),
        non_empty(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("All fields required"));
    };

    let user = state.db.create_user(username, email, password)?;
    info!(user_id = user.id, "Account created");

    Ok(Json(MessageResponse::new("Account created successfully")))
}

/// POST /api/auth/login - Start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let req: LoginRequest = read_json(request).await?;

    let Some(user) = state.db.authenticate(&req.email, &req.password)? else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "Invalid credentials"
            })),
        )
            .into_response());
    };

    let token = state.db.create_session(user.id, state.config.session_ttl)?;
    let cookie = session_cookie(&state, &token, state.config.session_ttl.num_seconds());
    info!(user_id = user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": user
        })),
    )
        .into_response())
}

/// POST /api/auth/logout - End the current session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(request.headers()) {
        state.db.delete_session(&token)?;
    }

    Ok((
        [(header::SET_COOKIE, session_cookie(&state, "", 0))],
        Json(MessageResponse::new("Logged out")),
    )
        .into_response())
}

/// GET /api/auth/me - The logged-in user
pub async fn get_me(request: Request) -> Result<Json<User>, AppError> {
    Ok(Json(current_user(&request)?))
}
