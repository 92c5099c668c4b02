//! Pluggable AI backend abstraction
//!
//! The monthly insights narrative and the advisor chat both go through
//! [`AIBackend`]. Callers treat a missing client as "AI not configured" and
//! fall back to computed text.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the operations every backend provides
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_config(&config.ai);
//!
//! if let Some(ref client) = ai {
//!     let narrative = client.generate_insights(&prompt).await?;
//!     println!("{}", narrative.summary);
//! }
//! ```
//!
//! # Configuration
//!
//! See [`crate::config::AiConfig`]. Relevant environment variables:
//! - `FINHABITS_AI_BACKEND`: gemini (default), openai_compatible, mock, none
//! - `GEMINI_API_KEY`: required for the gemini backend
//! - `OPENAI_COMPATIBLE_HOST` / `_MODEL` / `_API_KEY`: openai_compatible backend

mod gemini;
mod mock;
mod openai_compatible;
pub mod parsing;
pub mod prompts;
pub mod types;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL};
pub use mock::MockBackend;
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_OPENAI_MODEL};
pub use types::*;

use async_trait::async_trait;

use crate::config::{AiBackendKind, AiConfig};
use crate::error::Result;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Write the monthly narrative for a comparison and habit summary
    async fn generate_insights(&self, prompt: &InsightPrompt) -> Result<InsightNarrative>;

    /// Answer a free-form question given the rendered user context
    async fn answer_question(&self, context: &str, question: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini (API key)
    Gemini(GeminiBackend),
    /// OpenAI-compatible backend (OpenAI, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from the resolved config
    ///
    /// Returns None when AI is disabled or the chosen backend is missing its
    /// required setting (API key for Gemini, host for OpenAI-compatible).
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let client = match config.backend {
            AiBackendKind::Gemini => GeminiBackend::from_config(config).map(AIClient::Gemini),
            AiBackendKind::OpenaiCompatible => {
                OpenAICompatibleBackend::from_config(config).map(AIClient::OpenAICompatible)
            }
            AiBackendKind::Mock => Some(AIClient::mock()),
            AiBackendKind::None => None,
        };

        match &client {
            Some(c) => tracing::info!(host = %c.host(), model = %c.model(), "AI backend configured"),
            None if config.backend != AiBackendKind::None => {
                tracing::warn!(backend = ?config.backend, "AI backend missing required settings, AI features disabled")
            }
            None => tracing::debug!("AI features disabled"),
        }
        client
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate_insights(&self, prompt: &InsightPrompt) -> Result<InsightNarrative> {
        match self {
            AIClient::Gemini(b) => b.generate_insights(prompt).await,
            AIClient::OpenAICompatible(b) => b.generate_insights(prompt).await,
            AIClient::Mock(b) => b.generate_insights(prompt).await,
        }
    }

    async fn answer_question(&self, context: &str, question: &str) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.answer_question(context, question).await,
            AIClient::OpenAICompatible(b) => b.answer_question(context, question).await,
            AIClient::Mock(b) => b.answer_question(context, question).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
