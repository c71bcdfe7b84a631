use crate::error::AssistantError;

/// Remote chat backends the character can be wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantBackend {
    Anthropic,
    OpenAICompatible,
}

impl std::str::FromStr for AssistantBackend {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(AssistantBackend::Anthropic),
            "openai-compatible" | "openai_compatible" | "local" => {
                Ok(AssistantBackend::OpenAICompatible)
            }
            _ => Err(AssistantError::InvalidRequest(format!(
                "Unknown assistant backend: {s}"
            ))),
        }
    }
}
