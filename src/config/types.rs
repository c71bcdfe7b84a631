use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::response::FallbackOdds;

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const DEFAULT_TTS_API_URL: &str = "https://www.tetyys.com/SAPI4/SAPI4";
const DEFAULT_TTS_VOICE: &str = "Adult Male #2, American English (TruVoice)";

/// Everything `config.yaml` can set. Every key is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuddyConfig {
    /// `anthropic` or `openai-compatible`.
    pub backend: String,
    #[serde(alias = "anthropic_api_key")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is empty.
    pub api_key_env: String,
    pub api_enabled: bool,
    pub model: String,
    #[serde(alias = "temp")]
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub min_p: Option<f32>,
    #[serde(alias = "inference_api_url")]
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub request_timeout_seconds: u64,
    pub retry_attempts: usize,
    pub history_pairs: usize,

    pub use_system_tts: bool,
    pub system_voice: String,
    pub tts_api_url: String,
    pub tts_voice: String,
    pub tts_pitch: String,
    pub tts_speed: String,
    /// Player command line; the audio file path is appended as the last argument.
    pub audio_player: String,
    pub audio_dir: PathBuf,
    pub speech_ms_per_word: u64,
    pub speech_min_ms: u64,

    pub asset_dirs: Vec<PathBuf>,
    pub frame_interval_ms: u64,
    pub teleport_interval_seconds: u64,
    pub chatter_min_seconds: u64,
    pub chatter_max_seconds: u64,
    pub random_animations: bool,
    pub fallback_odds: FallbackOdds,
    pub welcome: bool,
    pub screen_width: u32,
    pub screen_height: u32,

    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for BuddyConfig {
    fn default() -> Self {
        Self {
            backend: "anthropic".to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_enabled: true,
            model: DEFAULT_MODEL.to_string(),
            temperature: 1.0,
            max_tokens: 300,
            top_p: None,
            min_p: None,
            base_url: None,
            system_prompt: None,
            request_timeout_seconds: 20,
            retry_attempts: 1,
            history_pairs: 3,
            use_system_tts: true,
            system_voice: "Alex".to_string(),
            tts_api_url: DEFAULT_TTS_API_URL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            tts_pitch: "140".to_string(),
            tts_speed: "157".to_string(),
            audio_player: "afplay".to_string(),
            audio_dir: PathBuf::from("audio"),
            speech_ms_per_word: 500,
            speech_min_ms: 1500,
            asset_dirs: vec![PathBuf::from(".")],
            frame_interval_ms: 100,
            teleport_interval_seconds: 30,
            chatter_min_seconds: 15,
            chatter_max_seconds: 30,
            random_animations: true,
            fallback_odds: FallbackOdds::default(),
            welcome: true,
            screen_width: 1920,
            screen_height: 1080,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl BuddyConfig {
    /// The configured key, or the one in `api_key_env` when the config leaves it blank.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(10))
    }

    pub fn teleport_interval(&self) -> Duration {
        Duration::from_secs(self.teleport_interval_seconds.max(1))
    }

    /// Bounds of the random-chatter delay, ordered even if configured
    /// backwards and never shorter than a second.
    pub fn chatter_window(&self) -> (Duration, Duration) {
        let low = self.chatter_min_seconds.min(self.chatter_max_seconds).max(1);
        let high = self.chatter_min_seconds.max(self.chatter_max_seconds).max(low);
        (Duration::from_secs(low), Duration::from_secs(high))
    }
}
