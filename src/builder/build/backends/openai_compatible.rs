use crate::backends::openai_compatible::{
    OpenAICompatible, OpenAICompatibleConfig, DEFAULT_ENDPOINT,
};
use crate::chat::ChatProvider;
use crate::error::AssistantError;

use super::super::helpers;
use crate::builder::state::BuilderState;

const DEFAULT_LOCAL_MODEL: &str = "bonzi-buddy";

pub(super) fn build_openai_compatible(
    state: &mut BuilderState,
) -> Result<Box<dyn ChatProvider>, AssistantError> {
    let provider = OpenAICompatible::new(OpenAICompatibleConfig {
        api_key: helpers::optional_api_key(state),
        endpoint: state
            .base_url
            .take()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        model: state
            .model
            .take()
            .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string()),
        max_tokens: state.max_tokens.unwrap_or(helpers::DEFAULT_MAX_TOKENS),
        temperature: state.temperature.unwrap_or(helpers::DEFAULT_TEMPERATURE),
        top_p: state.top_p,
        min_p: state.min_p,
        system: state.system.take(),
        timeout_seconds: helpers::timeout_or_default(state),
    })?;

    Ok(Box::new(provider))
}
