use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::chat::{ChatMessage, ChatProvider, ChatResponse};
use crate::error::AssistantError;

use super::config::ResilienceConfig;

/// Retries transient provider failures with exponential backoff.
///
/// The orchestrator's request timeout still bounds the whole call, retries
/// included.
pub struct ResilientAssistant {
    inner: Box<dyn ChatProvider>,
    cfg: ResilienceConfig,
}

impl ResilientAssistant {
    pub fn new(inner: Box<dyn ChatProvider>, cfg: ResilienceConfig) -> Self {
        Self { inner, cfg }
    }

    fn is_retryable(err: &AssistantError) -> bool {
        match err {
            AssistantError::HttpError(_) => true,
            AssistantError::RateLimited(_) => true,
            AssistantError::ProviderError(_) => true,
            AssistantError::ResponseFormatError { .. } => true,
            AssistantError::JsonError(_) => true,
            AssistantError::Timeout(_) => true,
            AssistantError::AuthError(_) => false,
            AssistantError::InvalidRequest(_) => false,
            AssistantError::RetryExceeded { .. } => false,
        }
    }

    fn backoff_delay(&self, attempt_index: usize) -> Duration {
        let mut delay = self
            .cfg
            .base_delay_ms
            .saturating_mul(1u64 << attempt_index.min(16));
        delay = delay.min(self.cfg.max_delay_ms);
        if self.cfg.jitter {
            let span = (delay / 2).max(1);
            let jitter = ((attempt_index as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1))
                % span;
            delay = delay.saturating_sub(jitter);
        }
        Duration::from_millis(delay)
    }
}

#[async_trait]
impl ChatProvider for ResilientAssistant {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, AssistantError> {
        let max_attempts = self.cfg.max_attempts.max(1);
        let mut last_err: Option<AssistantError> = None;

        for attempt in 0..max_attempts {
            match self.inner.chat(messages).await {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    if !Self::is_retryable(&err) || max_attempts == 1 {
                        return Err(err);
                    }
                    if attempt + 1 == max_attempts {
                        last_err = Some(err);
                        break;
                    }
                    log::warn!(
                        "{} attempt {}/{} failed: {}",
                        self.inner.name(),
                        attempt + 1,
                        max_attempts,
                        err
                    );
                    last_err = Some(err);
                    sleep(self.backoff_delay(attempt)).await;
                }
            }
        }

        Err(AssistantError::RetryExceeded {
            attempts: max_attempts,
            last_error: last_err.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
