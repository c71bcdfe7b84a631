use secrecy::SecretString;

use super::backend::AssistantBackend;

#[derive(Default)]
pub(crate) struct BuilderState {
    pub(crate) backend: Option<AssistantBackend>,
    pub(crate) api_key: Option<SecretString>,
    pub(crate) base_url: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) max_tokens: Option<u32>,
    pub(crate) temperature: Option<f32>,
    pub(crate) top_p: Option<f32>,
    pub(crate) min_p: Option<f32>,
    pub(crate) system: Option<String>,
    pub(crate) timeout_seconds: Option<u64>,
    pub(crate) resilient_attempts: Option<usize>,
    pub(crate) resilient_base_delay_ms: Option<u64>,
    pub(crate) resilient_max_delay_ms: Option<u64>,
}

impl BuilderState {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}
