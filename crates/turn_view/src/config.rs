use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::terminal::assistant_message::DEFAULT_PADDING_X;
use crate::ui::terminal::theme::{Theme, ThemeError};

/// Environment variable overriding `hideThinkingBlock`.
pub const HIDE_THINKING_ENV: &str = "TURN_VIEW_HIDE_THINKING";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value `{value}` for {name} (expected true/false/1/0/yes/no)")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub hide_thinking_block: bool,
    pub padding_x: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hide_thinking_block: false,
            padding_x: DEFAULT_PADDING_X,
            theme: None,
        }
    }
}

impl Settings {
    /// `<config dir>/turn-view/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("turn-view").join("settings.json"))
    }

    /// Load settings from `explicit` (must exist) or the default path (may be
    /// missing), then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::debug!("No settings file found, using defaults");
                    Self::default()
                }
            },
        };
        settings.apply_env_from(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(HIDE_THINKING_ENV) {
            self.hide_thinking_block =
                parse_bool_str(&value).ok_or_else(|| ConfigError::InvalidEnv {
                    name: HIDE_THINKING_ENV,
                    value,
                })?;
        }
        Ok(())
    }

    /// Theme from the configured file, or one matching the terminal background.
    pub fn load_theme(&self) -> Result<Theme, ThemeError> {
        match &self.theme {
            Some(path) => Theme::from_file(path),
            None => Ok(Theme::detect()),
        }
    }
}

/// Parse "true"/"false"/"1"/"0"/"yes"/"no" (case-insensitive, trims whitespace).
pub fn parse_bool_str(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
