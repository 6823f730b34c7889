use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{DownloadOptions, OrchestratorConfig};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "DOWNLOAD_QUEUE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Application settings, every field optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub download_directory: Option<PathBuf>,
    pub show_badge: bool,
    pub open_folder_when_done: bool,
    pub error_message: Option<String>,
    pub error_title: Option<String>,
    pub show_error_dialog: bool,
    pub stall_timeout_secs: Option<u64>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_directory: None,
            show_badge: true,
            open_folder_when_done: false,
            error_message: None,
            error_title: None,
            show_error_dialog: false,
            stall_timeout_secs: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads from `$DOWNLOAD_QUEUE_CONFIG`, else `settings.json`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            download_directory: self.download_directory.clone(),
            stall_timeout: self.stall_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            show_badge: self.show_badge,
            open_folder_when_done: self.open_folder_when_done,
            error_message: self.error_message.clone(),
            error_title: self.error_title.clone(),
            show_error_dialog: self.show_error_dialog,
            ..DownloadOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.orchestrator_config().stall_timeout.is_none());
    }

    #[test]
    fn test_partial_file_overrides_some_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "stall_timeout_secs": 90, "show_badge": false, "error_message": "Lost {filename}" }"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(
            settings.orchestrator_config().stall_timeout,
            Some(Duration::from_secs(90))
        );
        let options = settings.download_options();
        assert!(!options.show_badge);
        assert_eq!(options.error_message.as_deref(), Some("Lost {filename}"));
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
