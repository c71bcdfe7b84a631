use crate::backends::anthropic::Anthropic;
use crate::chat::ChatProvider;
use crate::config::DEFAULT_MODEL;
use crate::error::AssistantError;

use super::super::helpers;
use crate::builder::state::BuilderState;

pub(super) fn build_anthropic(
    state: &mut BuilderState,
) -> Result<Box<dyn ChatProvider>, AssistantError> {
    let api_key = helpers::require_api_key(state, "Anthropic")?;
    let timeout = helpers::timeout_or_default(state);

    let provider = Anthropic::new(
        api_key,
        state.base_url.take(),
        state.model.take().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        state.max_tokens.unwrap_or(helpers::DEFAULT_MAX_TOKENS),
        state.temperature.unwrap_or(helpers::DEFAULT_TEMPERATURE),
        timeout,
        state.system.take(),
    )?;

    Ok(Box::new(provider))
}
