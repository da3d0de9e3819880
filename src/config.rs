use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;
use crate::models::UserHistoryMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub history: HistoryConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            event_bus_buffer_size: constants::events::DEFAULT_BUS_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// "unfiltered" returns the whole log for any user, "by_submitter"
    /// filters on task attribution.
    pub user_history_mode: UserHistoryMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    /// Emit log lines as JSON objects instead of the human readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            json_logs: false,
        }
    }
}

impl Config {
    /// Loads the first config file found in the standard locations, or the
    /// defaults when there is none.
    pub fn load() -> Result<Self> {
        Self::load_first_existing(&Self::config_paths())
    }

    fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => {
                info!(path = %path.display(), "Loading config");
                Self::load_from_path(path)
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(constants::config::FILE_NAME)];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(
                config_dir
                    .join(constants::config::APP_DIR)
                    .join(constants::config::FILE_NAME),
            );
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(
                home.join(format!(".{}", constants::config::APP_DIR))
                    .join(constants::config::FILE_NAME),
            );
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.event_bus_buffer_size == 0 {
            anyhow::bail!("Event bus buffer size must be > 0");
        }

        if self.general.log_level.trim().is_empty() {
            anyhow::bail!("Log level cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.event_bus_buffer_size, 100);
        assert_eq!(config.history.user_history_mode, UserHistoryMode::Unfiltered);
        assert!(config.observability.metrics_enabled);
        assert!(!config.observability.json_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[history]"));
        assert!(toml_str.contains("user_history_mode = \"unfiltered\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [history]
            user_history_mode = "by_submitter"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.history.user_history_mode, UserHistoryMode::BySubmitter);

        assert_eq!(config.general.event_bus_buffer_size, 100);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let mut config = Config::default();
        config.general.event_bus_buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("modelhub-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        let mut config = Config::default();
        config.general.log_level = "warn".to_string();
        config.observability.json_logs = true;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.general.log_level, "warn");
        assert!(loaded.observability.json_logs);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_config_paths_search_order() {
        let paths = Config::config_paths();
        assert_eq!(paths[0], PathBuf::from("config.toml"));
        assert!(paths[1..].iter().all(|p| {
            p.ends_with("modelhub/config.toml") || p.ends_with(".modelhub/config.toml")
        }));
    }

    #[test]
    fn test_load_first_existing_candidate() {
        let dir = std::env::temp_dir().join(format!("modelhub-search-{}", uuid::Uuid::new_v4()));
        let missing = dir.join("missing.toml");
        let first = dir.join("first.toml");
        let second = dir.join("second.toml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&first, "[general]\nlog_level = \"debug\"\n").unwrap();
        std::fs::write(&second, "[general]\nlog_level = \"trace\"\n").unwrap();

        let config =
            Config::load_first_existing(&[missing.clone(), first, second]).unwrap();
        assert_eq!(config.general.log_level, "debug");

        let fallback = Config::load_first_existing(&[missing, dir.clone()]).unwrap();
        assert_eq!(fallback.general.log_level, "info");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_fails_with_context() {
        let path = std::env::temp_dir().join(format!("modelhub-missing-{}.toml", uuid::Uuid::new_v4()));
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
