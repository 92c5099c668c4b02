//! Test utilities for finhabits-core
//!
//! Provides a mock AI server speaking both the Gemini `generateContent` API
//! and the OpenAI chat completions API, for backend and integration tests.

use axum::{
    extract::{Json, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// API key the mock Gemini endpoints accept
pub const MOCK_GEMINI_KEY: &str = "key";

/// Mock AI server for testing and development
pub struct MockAiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1beta/models", get(handle_gemini_models))
            .route("/v1beta/models/:model_action", post(handle_gemini_generate))
            .route("/v1/models", get(handle_openai_models))
            .route("/v1/chat/completions", post(handle_chat_completions));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn gemini_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|k| k == MOCK_GEMINI_KEY)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": 401, "message": "API key not valid"}})),
    )
        .into_response()
}

/// Narrative every mock insight request gets back
fn mock_narrative() -> String {
    json!({
        "summary": "You kept spending under control this month.",
        "comparison": "Spending was lower than last month.",
        "suggestions": [
            "Cook at home twice a week",
            "Set a weekly entertainment budget",
            "Keep up your study streak"
        ]
    })
    .to_string()
}

/// Advisor reply quoting the question back
fn mock_answer(prompt: &str) -> String {
    let question = prompt
        .find("User's Question: ")
        .map(|start| {
            let rest = &prompt[start + "User's Question: ".len()..];
            rest.lines().next().unwrap_or_default().trim().to_string()
        })
        .unwrap_or_default();
    format!("Mock advice for: {}", question)
}

async fn handle_gemini_models(headers: HeaderMap) -> Response {
    if !gemini_authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"models": [{"name": "models/gemini-test"}]})).into_response()
}

/// Gemini generate endpoint; the path segment is `{model}:generateContent`
async fn handle_gemini_generate(
    headers: HeaderMap,
    Path(model_action): Path<String>,
    Json(request): Json<Value>,
) -> Response {
    if !gemini_authorized(&headers) {
        return unauthorized();
    }
    if !model_action.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    let wants_json = request["generationConfig"]["responseMimeType"].as_str()
        == Some("application/json");

    let text = if wants_json {
        mock_narrative()
    } else {
        mock_answer(prompt)
    };

    Json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]}
        }]
    }))
    .into_response()
}

async fn handle_openai_models() -> Json<Value> {
    Json(json!({"object": "list", "data": [{"id": "test-model", "object": "model"}]}))
}

async fn handle_chat_completions(Json(request): Json<Value>) -> Json<Value> {
    let prompt = request["messages"][0]["content"]
        .as_str()
        .unwrap_or_default();
    let content = if request.get("response_format").is_some() {
        mock_narrative()
    } else {
        mock_answer(prompt)
    };

    Json(json!({
        "model": request["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content}
        }]
    }))
}
