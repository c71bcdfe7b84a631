use secrecy::ExposeSecret;

use crate::error::AssistantError;

use super::super::state::BuilderState;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub(super) const DEFAULT_MAX_TOKENS: u32 = 300;
pub(super) const DEFAULT_TEMPERATURE: f32 = 1.0;

pub(super) fn log_builder_state(state: &BuilderState) {
    log::debug!(
        "Building assistant. backend={:?} model={:?} max_tokens={:?} temp={:?} retries={:?}",
        state.backend,
        state.model,
        state.max_tokens,
        state.temperature,
        state.resilient_attempts,
    );
}

pub(super) fn require_api_key(
    state: &mut BuilderState,
    provider: &str,
) -> Result<String, AssistantError> {
    let Some(key) = state.api_key.take() else {
        return Err(AssistantError::AuthError(format!(
            "No API key provided for {provider}"
        )));
    };
    Ok(key.expose_secret().to_string())
}

pub(super) fn optional_api_key(state: &mut BuilderState) -> Option<String> {
    state
        .api_key
        .take()
        .map(|key| key.expose_secret().to_string())
}

pub(super) fn timeout_or_default(state: &BuilderState) -> Option<u64> {
    Some(state.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
}
