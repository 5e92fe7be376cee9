//! User settings loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::xdg::XdgDirs;

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Every key is optional; missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name in the header, typing indicator and demo replies.
    pub assistant_name: String,
    pub tagline: String,
    /// How long the demo responder waits before answering.
    pub response_delay_ms: u64,
    /// Bundled syntect theme for code blocks.
    pub code_theme: String,
    /// UI redraw interval.
    pub tick_rate_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assistant_name: "NoAI".to_string(),
            tagline: "Minimalistic Chat Interface".to_string(),
            response_delay_ms: crate::responder::DEFAULT_RESPONSE_DELAY.as_millis() as u64,
            code_theme: crate::render::DEFAULT_CODE_THEME.to_string(),
            tick_rate_ms: 100,
        }
    }
}

impl Settings {
    /// Load from the XDG config file, falling back to defaults when absent.
    pub fn load(dirs: &XdgDirs) -> Result<Self, ConfigError> {
        let path = dirs.config_file();
        match Self::load_from_path(&path) {
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load from a specific path. A missing file is an error here.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "tick_rate_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.assistant_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "assistant_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}
