//! Platform-specific locations for the settings file.
//!
//! - Linux: `~/.config/timbre/settings.toml`
//! - macOS: `~/Library/Application Support/timbre/settings.toml`
//! - Windows: `%APPDATA%\timbre\settings.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "timbre";

/// File name of the settings file.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default settings file path inside [`user_config_dir`].
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}
