//! Application settings
//!
//! Settings are stored as TOML. Every field has a default, so a missing
//! file or a partial file both load cleanly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::APP_DIR_NAME;
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput, span_names};

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Errors that can occur while loading or saving settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for [`Settings`]
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be encoded
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No platform config directory is available
    #[error("no config directory available")]
    NoConfigDirectory,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Editor layout and session behaviour
    pub session: SessionSettings,
    /// Logging
    pub logging: LoggingSettings,
}

/// Editor layout and session behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Number of previously focused editors to remember. Zero disables the
    /// focus history.
    pub focus_history_limit: usize,
    /// Restore the saved layout when a workspace opens
    pub restore_on_open: bool,
    /// Remove restored editors whose documents all disappeared
    pub prune_emptied_editors: bool,
    /// Move focus to the editor created by a split
    pub focus_new_split: bool,
    /// Open the source editor's selected document in the new split
    pub open_selected_in_split: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            focus_history_limit: 32,
            restore_on_open: true,
            prune_emptied_editors: true,
            focus_new_split: true,
            open_selected_in_split: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Custom `EnvFilter` directive, overrides `level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Log file; logs go to stderr when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: TracingLevel::Info.to_string(),
            filter: None,
            file: None,
        }
    }
}

impl LoggingSettings {
    /// Builds the tracing configuration described by these settings.
    ///
    /// An unrecognised level falls back to `info`.
    #[must_use]
    pub fn to_tracing_config(&self) -> TracingConfig {
        let level = self.level.parse::<TracingLevel>().unwrap_or_default();
        let output = self
            .file
            .as_ref()
            .map_or(TracingOutput::Stderr, |path| TracingOutput::File {
                path: path.clone(),
            });

        let config = TracingConfig::new().with_level(level).with_output(output);
        match &self.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }
}

impl Settings {
    /// Returns the default settings path,
    /// `<config_dir>/tabsplit/settings.toml`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDirectory` if the platform has no
    /// config directory.
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
            .ok_or(ConfigError::NoConfigDirectory)
    }

    /// Loads settings from `path`, or returns the defaults if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let _span = crate::trace_operation_debug!(span_names::CONFIG_LOAD).entered();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse settings");
            ConfigError::Parse(e)
        })
    }

    /// Saves settings to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be encoded or written.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let _span = crate::trace_operation_debug!(span_names::CONFIG_SAVE).entered();

        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "Saved settings");
        Ok(())
    }
}
