//! Flat YAML configuration with built-in defaults for every key.

mod error;
mod load;
mod types;

pub use error::ConfigError;
pub use load::{load_config, resolve_config_path, try_load_config, LoadedConfig, CONFIG_FILE_NAME};
pub use types::{BuddyConfig, DEFAULT_API_KEY_ENV, DEFAULT_MODEL};
