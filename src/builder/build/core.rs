use crate::chat::ChatProvider;
use crate::error::AssistantError;

use super::super::assistant_builder::AssistantBuilder;
use super::super::state::BuilderState;
use super::{backends, helpers, wrappers};

impl AssistantBuilder {
    pub fn build(self) -> Result<Box<dyn ChatProvider>, AssistantError> {
        self.state.build()
    }
}

impl BuilderState {
    pub(super) fn build(mut self) -> Result<Box<dyn ChatProvider>, AssistantError> {
        helpers::log_builder_state(&self);
        let backend = self
            .backend
            .take()
            .ok_or_else(|| AssistantError::InvalidRequest("No backend specified".to_string()))?;

        let provider = backends::build_backend(&mut self, backend)?;
        Ok(wrappers::wrap_with_resilience(&mut self, provider))
    }
}
