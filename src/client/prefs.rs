//! Client-local preferences.
//!
//! Stored as a small JSON object. Only the `theme` key is owned here; any
//! other keys already in the file are preserved on write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;

/// Key the theme preference is stored under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }
}

/// File-backed preference storage.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Store in the platform config directory, e.g.
    /// `~/.config/qqsync-webui/preferences.json`.
    pub fn platform_default() -> Self {
        Self {
            path: dirs::config_dir().map(|dir| dir.join("qqsync-webui").join("preferences.json")),
        }
    }

    /// A store that never persists anything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_all(&self) -> Map<String, Value> {
        let Some(path) = &self.path else {
            return Map::new();
        };
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!(path = %path.display(), "Ignoring malformed preferences file");
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        }
    }

    /// The saved theme, if any.
    pub fn theme(&self) -> Option<ThemePreference> {
        let prefs = self.read_all();
        let value = prefs.get(THEME_KEY)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn save_theme(&self, theme: ThemePreference) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut prefs = self.read_all();
        prefs.insert(THEME_KEY.to_string(), Value::from(theme.as_str()));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&prefs)?)?;
        debug!(path = %path.display(), theme = theme.as_str(), "Saved theme preference");
        Ok(())
    }
}
