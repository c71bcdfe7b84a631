use std::time::Duration;

use crate::config::BuddyConfig;
use crate::response::FallbackOdds;

/// Extra time the watchdog allows past the request timeout before it gives up
/// on a reply that never arrived.
const WATCHDOG_GRACE: Duration = Duration::from_secs(2);

/// Timing and behavior knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub frame_interval: Duration,
    /// `None` keeps the character in place.
    pub teleport_interval: Option<Duration>,
    /// Bounds of the random-chatter delay; `None` disables chatter.
    pub chatter_window: Option<(Duration, Duration)>,
    pub request_timeout: Duration,
    pub watchdog_grace: Duration,
    pub speech_ms_per_word: u64,
    pub speech_min: Duration,
    /// Decorate replies without JSON with random animations.
    pub random_animations: bool,
    pub fallback_odds: FallbackOdds,
    pub history_pairs: usize,
    pub welcome: bool,
    pub screen: (u32, u32),
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&BuddyConfig::default())
    }
}

impl From<&BuddyConfig> for OrchestratorConfig {
    fn from(config: &BuddyConfig) -> Self {
        Self {
            frame_interval: config.frame_interval(),
            teleport_interval: Some(config.teleport_interval()),
            chatter_window: Some(config.chatter_window()),
            request_timeout: config.request_timeout(),
            watchdog_grace: WATCHDOG_GRACE,
            speech_ms_per_word: config.speech_ms_per_word,
            speech_min: Duration::from_millis(config.speech_min_ms),
            random_animations: config.random_animations,
            fallback_odds: config.fallback_odds,
            history_pairs: config.history_pairs,
            welcome: config.welcome,
            screen: (config.screen_width, config.screen_height),
        }
    }
}
