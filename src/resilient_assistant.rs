#[path = "resilient_assistant/config.rs"]
mod config;

#[path = "resilient_assistant/wrapper.rs"]
mod wrapper;

pub use config::ResilienceConfig;
pub use wrapper::ResilientAssistant;
