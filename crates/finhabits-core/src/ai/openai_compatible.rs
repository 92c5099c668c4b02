//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenAI itself
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::error::{Error, Result};

use super::parsing::parse_insight_narrative;
use super::prompts::{advisor_prompt, insight_prompt};
use super::types::{InsightNarrative, InsightPrompt};
use super::AIBackend;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Build from config; `None` without a host
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let host = config.host.as_deref().filter(|h| !h.trim().is_empty())?;
        let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
        let mut backend = Self::new(host, model);
        backend.api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        Some(backend)
    }

    /// Make a chat completion request
    async fn chat_completion(&self, prompt: &str, json_output: bool) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.7),
            response_format: json_output.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        };
        debug!(model = %self.model, json_output, "OpenAI chat completion");

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Ai(format!("OpenAI API error {}: {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Ai("No response from OpenAI API".into()))
    }
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn generate_insights(&self, prompt: &InsightPrompt) -> Result<InsightNarrative> {
        let text = self.chat_completion(&insight_prompt(prompt), true).await?;
        parse_insight_narrative(&text)
    }

    async fn answer_question(&self, context: &str, question: &str) -> Result<String> {
        self.chat_completion(&advisor_prompt(context, question), false)
            .await
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .timeout(Duration::from_secs(5));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(error = %e, "OpenAI-compatible health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

// Request/response types for the chat completions API

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compare_months;
    use crate::config::AiBackendKind;

    #[test]
    fn test_from_config_requires_host() {
        let mut config = AiConfig {
            backend: AiBackendKind::OpenaiCompatible,
            ..Default::default()
        };
        assert!(OpenAICompatibleBackend::from_config(&config).is_none());

        config.host = Some("http://localhost:8000/".to_string());
        let backend = OpenAICompatibleBackend::from_config(&config).unwrap();
        assert_eq!(backend.host(), "http://localhost:8000");
        assert_eq!(backend.model(), DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_json_mode_serialization() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![],
            temperature: None,
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[tokio::test]
    async fn test_insights_against_mock_server() {
        let server = crate::test_utils::MockAiServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "test-model");

        assert!(backend.health_check().await);

        let prompt = InsightPrompt {
            comparison: compare_months(2024, 3, &[], &[]).unwrap(),
            habits: vec![],
        };
        let narrative = backend.generate_insights(&prompt).await.unwrap();
        assert!(!narrative.summary.is_empty());
        assert_eq!(narrative.suggestions.len(), 3);
    }
}
