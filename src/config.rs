// Config - User settings read from config.json

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "todo-manager";
pub const DATA_DIR_ENV: &str = "TODO_MANAGER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Where `tasks.json` and the logs live. Defaults to the platform's local
    /// data directory.
    pub data_dir: Option<PathBuf>,
    /// How long error and warning banners stay on screen.
    pub notification_secs: u64,
    pub atomic_writes: bool,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            notification_secs: 3,
            atomic_writes: true,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the config file from the user's config directory. A missing file
    /// gives the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    /// Data directory with the environment override applied.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.resolve_data_dir_with(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn resolve_data_dir_with(&self, env_override: Option<PathBuf>) -> PathBuf {
        env_override
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(default_data_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.resolved_data_dir().join("logs")
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.notification_timeout(), Duration::from_secs(3));
        assert!(config.atomic_writes);
        assert_eq!(config.log_filter, "info");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "notificationSecs": 5, "dataDir": "/tmp/todo" }"#).unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(config.notification_secs, 5);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/todo")));
        assert!(config.atomic_writes);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "notificationSecs = 5").unwrap();

        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_override_wins_over_config_file() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            ..AppConfig::default()
        };

        assert_eq!(
            config.resolve_data_dir_with(Some(PathBuf::from("/from/env"))),
            PathBuf::from("/from/env")
        );
        assert_eq!(config.resolve_data_dir_with(None), PathBuf::from("/from/config"));
    }

    #[test]
    fn default_data_dir_is_app_scoped() {
        let config = AppConfig::default();
        assert!(config.resolve_data_dir_with(None).ends_with(APP_DIR));
    }
}
