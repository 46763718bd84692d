use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_chunk_prompt, SYSTEM_PROMPT};

/// Availability and model name of a classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub available: bool,
    pub model: String,
}

/// Stateless per-chunk innocence signal classifier.
///
/// Returns the raw response text; parsing and validation happen in the core so
/// malformed payloads degrade to "no claims" instead of failing the run.
#[async_trait]
pub trait SignalClassifier: Send + Sync {
    async fn classify(&self, chunk_text: &str, context: Option<&str>) -> Result<String>;

    fn model_info(&self) -> ModelInfo;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Messages endpoint
    pub endpoint: String,
    /// Per-request timeout; a timed out chunk contributes no claims
    pub request_timeout: Duration,
}

impl ClassifierConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("TRIAGE_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.1,
            max_tokens: 4096,
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Anthropic API backed classifier
pub struct AnthropicClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl AnthropicClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// Send a message to Claude and get a response
    pub async fn send_message(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        // Concatenate text blocks; the JSON array may be split across them
        let text: String = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect();

        if text.is_empty() {
            anyhow::bail!("No text content in response");
        }
        Ok(text)
    }
}

#[async_trait]
impl SignalClassifier for AnthropicClassifier {
    async fn classify(&self, chunk_text: &str, context: Option<&str>) -> Result<String> {
        let prompt = build_chunk_prompt(chunk_text, context);
        self.send_message(SYSTEM_PROMPT, &prompt).await
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            available: !self.config.api_key.trim().is_empty(),
            model: self.config.model.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_unavailable() {
        let classifier = AnthropicClassifier::new(ClassifierConfig::new("  ".to_string())).unwrap();
        let info = classifier.model_info();
        assert!(!info.available);
        assert_eq!(info.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_response_text_blocks() {
        let json = r#"{"content": [{"type": "text", "text": "[]"}, {"type": "tool_use", "name": "x"}]}"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.content[0].text, "[]");
        assert!(response.content[1].text.is_empty());
    }
}
