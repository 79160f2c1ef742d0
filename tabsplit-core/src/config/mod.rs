//! Configuration management for `tabsplit`
//!
//! Settings are loaded from and saved to a TOML file, by default under the
//! platform config directory.

pub mod settings;

pub use settings::{
    ConfigError, ConfigResult, LoggingSettings, SETTINGS_FILE_NAME, SessionSettings, Settings,
};
