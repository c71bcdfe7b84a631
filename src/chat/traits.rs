use async_trait::async_trait;

use crate::error::AssistantError;

use super::message::ChatMessage;
use super::usage::Usage;

pub trait ChatResponse: std::fmt::Debug + std::fmt::Display + Send + Sync {
    fn text(&self) -> Option<String>;
    fn usage(&self) -> Option<Usage> {
        None
    }
}

/// The remote assistant as the orchestrator sees it.
///
/// Implementations are constructed once with their system prompt, model and
/// sampling parameters; `chat` only carries the role-tagged conversation.
#[async_trait]
pub trait ChatProvider: Sync + Send {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, AssistantError>;

    /// Short provider label used in logs.
    fn name(&self) -> &str {
        "assistant"
    }
}

/// Plain-text reply, used by wrappers and test doubles.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub text: String,
}

impl std::fmt::Display for TextResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl ChatResponse for TextResponse {
    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }
}
