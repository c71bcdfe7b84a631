//! Client for self-hosted OpenAI-compatible chat-completions servers.
//!
//! Sends a guided-JSON schema so servers that support constrained decoding
//! (vLLM and friends) answer with the reply object directly.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::chat::{ChatMessage, ChatProvider, ChatResponse, Usage};
use crate::error::AssistantError;

use super::{http_client, status_error};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/v1/chat/completions";

#[derive(Debug)]
pub struct OpenAICompatibleConfig {
    /// Optional bearer token; local servers usually need none.
    pub api_key: Option<String>,
    /// Full chat-completions URL.
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub min_p: Option<f32>,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct OpenAICompatible {
    pub config: Arc<OpenAICompatibleConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_p: Option<f32>,
    guided_json: Value,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct CompletionChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl std::fmt::Display for CompletionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl ChatResponse for CompletionResponse {
    fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.is_empty())
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

/// JSON schema of the reply object the character expects.
fn reply_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dialogue": {"type": "string"},
            "wave": {"type": "boolean"},
            "backflip": {"type": "boolean"},
            "glasses": {"type": "boolean"},
            "goodbye": {"type": "boolean"}
        },
        "required": ["dialogue", "wave", "backflip", "glasses", "goodbye"]
    })
}

impl OpenAICompatible {
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self, AssistantError> {
        let client = http_client(config.timeout_seconds)?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: OpenAICompatibleConfig) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatible {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, AssistantError> {
        let mut wire: Vec<CompletionMessage> = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.config.system {
            wire.push(CompletionMessage {
                role: "system",
                content: system,
            });
        }
        wire.extend(messages.iter().map(|m| CompletionMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        let body = CompletionRequest {
            model: &self.config.model,
            messages: wire,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            min_p: self.config.min_p,
            guided_json: reply_schema(),
            stream: false,
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Chat-completions request payload: {}", json);
            }
        }

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        log::debug!("Chat-completions HTTP status: {}", response.status());
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let raw = response.text().await?;
        let parsed: CompletionResponse =
            serde_json::from_str(&raw).map_err(|e| AssistantError::ResponseFormatError {
                message: format!("Failed to decode chat-completions response: {e}"),
                raw_response: raw.clone(),
            })?;
        Ok(Box::new(parsed))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
