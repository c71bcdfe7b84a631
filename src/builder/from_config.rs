use std::sync::Arc;

use crate::chat::ChatProvider;
use crate::config::{BuddyConfig, DEFAULT_MODEL};
use crate::persona::DEFAULT_SYSTEM_PROMPT;

use super::assistant_builder::AssistantBuilder;
use super::backend::AssistantBackend;

/// Builds the configured assistant, or `None` when the character should run
/// offline: the API is disabled, no key is available for a keyed backend, or
/// the configuration does not describe a usable backend.
pub fn assistant_from_config(config: &BuddyConfig) -> Option<Arc<dyn ChatProvider>> {
    if !config.api_enabled {
        log::info!("Assistant API disabled in config, running offline");
        return None;
    }

    let backend = match config.backend.parse::<AssistantBackend>() {
        Ok(backend) => backend,
        Err(e) => {
            log::warn!("{e}; running offline");
            return None;
        }
    };

    let mut builder = AssistantBuilder::new()
        .backend(backend)
        .max_tokens(config.max_tokens)
        .temperature(config.temperature)
        .timeout_seconds(config.request_timeout_seconds.max(1))
        .retry_attempts(config.retry_attempts)
        .system(
            config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        );

    match config.resolved_api_key() {
        Some(key) => builder = builder.api_key(key),
        None if backend == AssistantBackend::Anthropic => {
            log::warn!(
                "No API key in config or ${}, running offline",
                config.api_key_env
            );
            return None;
        }
        None => {}
    }
    if let Some(url) = &config.base_url {
        builder = builder.base_url(url.clone());
    }
    if backend == AssistantBackend::Anthropic || config.model != DEFAULT_MODEL {
        builder = builder.model(config.model.clone());
    }
    if let Some(top_p) = config.top_p {
        builder = builder.top_p(top_p);
    }
    if let Some(min_p) = config.min_p {
        builder = builder.min_p(min_p);
    }

    match builder.build() {
        Ok(provider) => Some(Arc::from(provider)),
        Err(e) => {
            log::warn!("Could not build assistant ({e}), running offline");
            None
        }
    }
}
