//! Anthropic Messages API client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatProvider, ChatResponse, Usage};
use crate::error::AssistantError;

use super::{http_client, status_error};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic client.
#[derive(Debug)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct Anthropic {
    pub config: Arc<AnthropicConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Deserialize, Debug)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl std::fmt::Display for AnthropicResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl ChatResponse for AnthropicResponse {
    fn text(&self) -> Option<String> {
        let text: Vec<&str> = self
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text.join(""))
        }
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

impl Anthropic {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        timeout_seconds: Option<u64>,
        system: Option<String>,
    ) -> Result<Self, AssistantError> {
        Ok(Self::with_client(
            http_client(timeout_seconds)?,
            AnthropicConfig {
                api_key: api_key.into(),
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: model.into(),
                max_tokens,
                temperature,
                system,
                timeout_seconds,
            },
        ))
    }

    pub fn with_client(client: Client, config: AnthropicConfig) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatProvider for Anthropic {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, AssistantError> {
        if self.config.api_key.is_empty() {
            return Err(AssistantError::AuthError(
                "Missing Anthropic API key".to_string(),
            ));
        }

        let body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: self.config.system.as_deref(),
            messages: messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Anthropic request payload: {}", json);
            }
        }

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        log::debug!("Anthropic HTTP status: {}", response.status());
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let raw = response.text().await?;
        let parsed: AnthropicResponse =
            serde_json::from_str(&raw).map_err(|e| AssistantError::ResponseFormatError {
                message: format!("Failed to decode Anthropic response: {e}"),
                raw_response: raw.clone(),
            })?;
        Ok(Box::new(parsed))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
