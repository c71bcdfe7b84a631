mod anthropic;
mod openai_compatible;

use crate::builder::AssistantBackend;
use crate::chat::ChatProvider;
use crate::error::AssistantError;

use crate::builder::state::BuilderState;

pub(super) fn build_backend(
    state: &mut BuilderState,
    backend: AssistantBackend,
) -> Result<Box<dyn ChatProvider>, AssistantError> {
    match backend {
        AssistantBackend::Anthropic => anthropic::build_anthropic(state),
        AssistantBackend::OpenAICompatible => openai_compatible::build_openai_compatible(state),
    }
}
