use super::assistant_builder::AssistantBuilder;

impl AssistantBuilder {
    /// Total attempts per turn; values above one wrap the backend in a retry layer.
    pub fn retry_attempts(mut self, attempts: usize) -> Self {
        self.state.resilient_attempts = Some(attempts);
        self
    }

    /// Sets base and max backoff delays in milliseconds.
    pub fn retry_backoff(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.state.resilient_base_delay_ms = Some(base_delay_ms);
        self.state.resilient_max_delay_ms = Some(max_delay_ms);
        self
    }
}
