//! Settings for the timbre analysis core.
//!
//! The DSP crate never touches the filesystem; hosts load a [`Settings`] here
//! and hand the option structs to the analysis calls and the worker.
//!
//! # Example
//!
//! ```rust,no_run
//! use timbre_config::{Settings, paths};
//!
//! let path = paths::default_settings_path();
//! let mut settings = Settings::load_or_default(&path).unwrap();
//! settings.normalization.target_rms_db = -16.0;
//! settings.save(&path).unwrap();
//! ```

mod error;
mod settings;

/// Platform-specific settings locations.
pub mod paths;

pub use error::ConfigError;
pub use settings::Settings;
pub use paths::{default_settings_path, user_config_dir};
