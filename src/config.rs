//! Layered configuration for the server and the terminal client.
//!
//! Values come from an optional JSON/TOML file, then from environment
//! variables prefixed with `QQSYNC_WEBUI_` (nested keys separated by `__`,
//! e.g. `QQSYNC_WEBUI_SERVER__PORT=9090`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_FILE: &str = "webui_config.json";

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub bridge: BridgeSettings,
    pub client: ClientSettings,
}

/// Where the dashboard server listens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    /// `host:port` suitable for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Files shared with the collaborator plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// JSON state document published by the collaborator plugin.
    pub state_file: PathBuf,
    /// Directory holding the daily message log files.
    pub message_dir: PathBuf,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("qqsync_state.json"),
            message_dir: PathBuf::from("msg"),
        }
    }
}

/// Terminal client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of a running dashboard server.
    pub base_url: String,
    /// Seconds between status polls.
    pub poll_interval_secs: u64,
    /// Link opened by the "about" action.
    pub about_url: String,
    /// Preferences file; the platform config dir is used when unset.
    pub prefs_file: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            poll_interval_secs: 30,
            about_url: "https://github.com/yuexps/endstone-qqsync-webui-plugin".to_string(),
            prefs_file: None,
        }
    }
}

impl ClientSettings {
    /// Time between status polls, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Settings {
    /// Load settings from `path` (if it exists) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("QQSYNC_WEBUI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Write the default document to `path` unless a file is already there.
    ///
    /// Returns `true` when a file was written.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Wrote default configuration");
        Ok(true)
    }

    /// Check the settings and describe every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.server.port == 0 {
            errors.push("server.port must be an integer between 1 and 65535".to_string());
        }
        if self.server.host.trim().is_empty() {
            errors.push("server.host must be a valid host address".to_string());
        }
        if self.client.poll_interval_secs == 0 {
            errors.push("client.poll_interval_secs must be greater than zero".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_plugin_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(settings.client.poll_interval(), Duration::from_secs(30));
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_load_overrides_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("webui.json");
        std::fs::write(&path, r#"{ "server": { "port": 9000 } }"#).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.bridge, BridgeSettings::default());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(settings.server, ServerSettings::default());
    }

    #[test]
    fn test_write_default_if_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("webui_config.json");

        assert!(Settings::write_default_if_missing(&path).unwrap());
        assert!(!Settings::write_default_if_missing(&path).unwrap());

        let loaded = Settings::load(Some(&path)).unwrap();
        assert_eq!(loaded.server, ServerSettings::default());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        settings.server.host = " ".to_string();
        settings.client.poll_interval_secs = 0;

        let errors = settings.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("server.port"));

        // Still usable: a zero interval polls once a second
        assert_eq!(settings.client.poll_interval(), Duration::from_secs(1));
    }
}
