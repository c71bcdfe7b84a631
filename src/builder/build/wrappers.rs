use crate::chat::ChatProvider;
use crate::resilient_assistant::{ResilienceConfig, ResilientAssistant};

use super::super::state::BuilderState;

pub(super) fn wrap_with_resilience(
    state: &mut BuilderState,
    provider: Box<dyn ChatProvider>,
) -> Box<dyn ChatProvider> {
    let attempts = state.resilient_attempts.unwrap_or(1);
    if attempts <= 1 {
        return provider;
    }

    let mut cfg = ResilienceConfig::with_attempts(attempts);
    if let Some(base) = state.resilient_base_delay_ms {
        cfg.base_delay_ms = base;
    }
    if let Some(maxd) = state.resilient_max_delay_ms {
        cfg.max_delay_ms = maxd;
    }
    Box::new(ResilientAssistant::new(provider, cfg))
}
