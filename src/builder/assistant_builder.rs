use secrecy::SecretString;

use super::{backend::AssistantBackend, state::BuilderState};

/// Builder for the remote assistant the character talks to.
pub struct AssistantBuilder {
    pub(super) state: BuilderState,
}

impl Default for AssistantBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::new(),
        }
    }
}

impl AssistantBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: AssistantBackend) -> Self {
        self.state.backend = Some(backend);
        self
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.state.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Base URL for Anthropic, full chat-completions URL for compatible servers.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.state.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.state.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.state.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.state.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.state.top_p = Some(top_p);
        self
    }

    pub fn min_p(mut self, min_p: f32) -> Self {
        self.state.min_p = Some(min_p);
        self
    }

    /// Sets the in-character system prompt.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.state.system = Some(system.into());
        self
    }

    /// Per-request HTTP timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.state.timeout_seconds = Some(timeout_seconds);
        self
    }
}
