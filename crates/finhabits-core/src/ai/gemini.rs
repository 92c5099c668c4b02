//! Google Gemini backend
//!
//! Talks to the `generateContent` REST endpoint. Insight requests ask for
//! `application/json` output so the narrative can be deserialized directly.

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

pub const DEFAULT_GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini backend (API key authenticated)
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build from config; `None` without an API key
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        let host = config.host.as_deref().unwrap_or(DEFAULT_GEMINI_HOST);
        let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        Some(Self::new(host, model, api_key))
    }

    async fn generate(&self, prompt: &str, json_output: bool) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.7),
                response_mime_type: json_output.then(|| "application/json".to_string()),
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(model = %self.model, json_output, "Gemini generateContent");

        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Ai(format!("Gemini API error {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Ai("Empty response from Gemini API".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl AIBackend for GeminiBackend {
    async fn generate_insights(&self, prompt: &InsightPrompt) -> Result<InsightNarrative> {
        let text = self.generate(&insight_prompt(prompt), true).await?;
        parse_insight_narrative(&text)
    }

    async fn answer_question(&self, context: &str, question: &str) -> Result<String> {
        self.generate(&advisor_prompt(context, question), false)
            .await
    }

    async fn health_check(&self) -> bool {
        let result = self
            .http_client
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match result {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Gemini health check failed");
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

// Wire types for generateContent

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiBackendKind;

    #[test]
    fn test_from_config_requires_key() {
        let mut config = AiConfig {
            backend: AiBackendKind::Gemini,
            ..Default::default()
        };
        assert!(GeminiBackend::from_config(&config).is_none());

        config.api_key = Some("  ".to_string());
        assert!(GeminiBackend::from_config(&config).is_none());

        config.api_key = Some("key".to_string());
        let backend = GeminiBackend::from_config(&config).unwrap();
        assert_eq!(backend.host(), DEFAULT_GEMINI_HOST);
        assert_eq!(backend.model(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_mime_type: Some("application/json".to_string()),
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_against_mock_server() {
        let server = crate::test_utils::MockAiServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", "key");

        assert!(backend.health_check().await);

        let answer = backend.answer_question("ctx", "Can I afford pizza?").await.unwrap();
        assert!(answer.contains("Can I afford pizza?"));
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = crate::test_utils::MockAiServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", "wrong-key");
        let err = backend.answer_question("ctx", "q").await.unwrap_err();
        assert!(matches!(err, Error::Ai(_)));
        assert!(!backend.health_check().await);
    }
}
