//! FinHabits Web Server
//!
//! Axum-based JSON API for the FinHabits spending and habit tracker.
//!
//! Security features:
//! - Cookie sessions backed by hashed tokens in the database
//! - Restrictive CORS policy
//! - Sanitized error responses
//! - Per-user data scoping on every query

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use finhabits_core::ai::{AIBackend, AIClient};
use finhabits_core::config::ServerSettings;
use finhabits_core::db::Database;
use finhabits_core::models::User;

mod handlers;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "finhabits_session";

/// Maximum JSON request body (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// How long a login stays valid
    pub session_ttl: chrono::Duration,
    /// Add `Secure` to the session cookie (HTTPS deployments)
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            session_ttl: chrono::Duration::days(7),
            secure_cookies: false,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            allowed_origins: settings.allowed_origins.clone(),
            session_ttl: chrono::Duration::hours(settings.session_ttl_hours.max(1)),
            secure_cookies: settings.secure_cookies,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub ai: Option<AIClient>,
}

/// The user resolved from the session cookie, stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the session token from the `Cookie` header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// Get the logged-in user for a request that passed the session middleware
pub fn current_user(request: &Request) -> Result<User, AppError> {
    request
        .extensions()
        .get::<CurrentUser>()
        .map(|current| current.0.clone())
        .ok_or_else(AppError::unauthorized)
}

/// The server's idea of "today" for date defaults and future-date checks
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Session middleware - resolves the `finhabits_session` cookie to a user
///
/// Applied to every API route except signup and login. Requests without a
/// live session get 401 before reaching a handler.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        debug!(path = %request.uri().path(), "Request without session cookie");
        return AppError::unauthorized().into_response();
    };

    match state.db.session_user(&token, Utc::now()) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(None) => {
            debug!(path = %request.uri().path(), "Unknown or expired session");
            AppError::unauthorized().into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Success response with a human-readable message
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            id: None,
        }
    }

    pub fn with_id(message: &str, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::new(message)
        }
    }
}

/// Create the application router
pub fn create_router(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    ai: Option<AIClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        ai,
    });

    let public_routes = Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login));

    let protected_routes = Router::new()
        // Auth
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::get_me))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/expenses/all", get(handlers::list_all_expenses))
        .route(
            "/expenses/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        // Income
        .route(
            "/income",
            get(handlers::list_income).post(handlers::create_income),
        )
        .route("/income/all", get(handlers::list_all_income))
        .route(
            "/income/:id",
            put(handlers::update_income).delete(handlers::delete_income),
        )
        // Habits
        .route(
            "/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/habits/log",
            get(handlers::list_habit_logs).post(handlers::log_habit),
        )
        .route("/habits/log/all", get(handlers::list_all_habit_logs))
        .route("/streaks", get(handlers::get_streaks))
        // Calendar and stats
        .route("/calendar/:year/:month", get(handlers::get_calendar))
        .route("/stats/today", get(handlers::get_today_stats))
        .route("/stats/all-time", get(handlers::get_all_time_stats))
        .route(
            "/stats/monthly/:year/:month",
            get(handlers::get_monthly_comparison),
        )
        // AI
        .route("/insights/:year/:month", get(handlers::get_insights))
        .route("/chatbot", post(handlers::chatbot))
        // Savings
        .route(
            "/savings",
            get(handlers::list_savings).post(handlers::create_saving),
        )
        .route("/savings/:id", delete(handlers::delete_saving))
        // Export
        .route("/export/full", get(handlers::export_full))
        .route("/export/expenses.csv", get(handlers::export_expenses_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Serve the web UI if a directory was provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
    ai: Option<AIClient>,
) -> anyhow::Result<()> {
    match db.purge_expired_sessions(Utc::now()) {
        Ok(count) if count > 0 => info!("Purged {} expired session(s)", count),
        Ok(_) => {}
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    check_ai_connection(ai.as_ref()).await;

    let app = create_router(db, static_dir, config, ai);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured; insights will use built-in summaries");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        use finhabits_core::Error as CoreError;

        let err = err.into();

        // Domain errors carry a message that is safe to show the client
        let client_error = match err.downcast_ref::<CoreError>() {
            Some(CoreError::InvalidData(msg)) => Some((StatusCode::BAD_REQUEST, msg.clone())),
            Some(CoreError::NotFound(msg)) => Some((StatusCode::NOT_FOUND, msg.clone())),
            Some(CoreError::Auth(msg)) => Some((StatusCode::UNAUTHORIZED, msg.clone())),
            Some(CoreError::Conflict(msg)) => Some((StatusCode::CONFLICT, msg.clone())),
            _ => None,
        };
        if let Some((status, message)) = client_error {
            return Self {
                status,
                message,
                internal: None,
            };
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
