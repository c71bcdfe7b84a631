use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::types::BuddyConfig;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BuddyConfig,
    pub path: PathBuf,
    pub exists: bool,
}

/// Picks the config file: an explicit override, then `./config.yaml`, then
/// the per-user config directory.
pub fn resolve_config_path(path_override: Option<PathBuf>) -> PathBuf {
    if let Some(path) = path_override {
        return path;
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("desk-buddy").join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Reads the config, surfacing IO and parse errors. A missing file is not an
/// error and yields the defaults.
pub fn try_load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let config = if contents.trim().is_empty() {
                BuddyConfig::default()
            } else {
                serde_yaml::from_str(&contents)?
            };
            Ok(LoadedConfig {
                config,
                path: path.to_path_buf(),
                exists: true,
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(LoadedConfig {
            config: BuddyConfig::default(),
            path: path.to_path_buf(),
            exists: false,
        }),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

/// Like [`try_load_config`], but any failure falls back to the defaults with
/// a warning. Startup never fails because of configuration.
pub fn load_config(path: &Path) -> LoadedConfig {
    match try_load_config(path) {
        Ok(loaded) => {
            if !loaded.exists {
                log::info!("No config at {}, using defaults", path.display());
            }
            loaded
        }
        Err(e) => {
            log::warn!("Ignoring config {}: {}", path.display(), e);
            LoadedConfig {
                config: BuddyConfig::default(),
                path: path.to_path_buf(),
                exists: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = load_config(&tmp.path().join("config.yaml"));
        assert!(!loaded.exists);
        assert_eq!(loaded.config.max_tokens, 300);
        assert!(loaded.config.api_enabled);
    }

    #[test]
    fn source_key_names_are_accepted() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.yaml");
        fs::write(
            &path,
            "anthropic_api_key: sk-test\ntemp: 0.4\nmax_tokens: 150\napi_enabled: false\nuse_system_tts: false\n",
        )
        .expect("write config");

        let loaded = load_config(&path);
        assert!(loaded.exists);
        assert_eq!(loaded.config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(loaded.config.temperature, 0.4);
        assert_eq!(loaded.config.max_tokens, 150);
        assert!(!loaded.config.api_enabled);
        assert!(!loaded.config.use_system_tts);
        assert_eq!(loaded.config.history_pairs, 3);
    }

    #[test]
    fn invalid_yaml_falls_back_to_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "max_tokens: [not, a, number").expect("write config");

        assert!(matches!(try_load_config(&path), Err(ConfigError::Yaml(_))));
        let loaded = load_config(&path);
        assert!(!loaded.exists);
        assert_eq!(loaded.config.model, super::super::DEFAULT_MODEL);
    }

    #[test]
    fn override_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/tmp/elsewhere.yaml")));
        assert_eq!(path, PathBuf::from("/tmp/elsewhere.yaml"));
    }
}
