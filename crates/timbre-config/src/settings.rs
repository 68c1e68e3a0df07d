//! Settings file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use timbre_dsp::{
    Band, CacheCapacity, FormantOptions, JoinOptions, LoudnessRange, NormalizationOptions,
    SpectrogramOptions,
};

use crate::error::ConfigError;

/// Every tunable of the analysis core, grouped by concern.
///
/// Missing tables and keys fall back to their defaults, so an empty file is a
/// valid settings file.
///
/// # TOML Format
///
/// ```toml
/// [formant]
/// fft_size = 2048
/// energy_threshold = 0.005
///
/// [formant.f1_band]
/// min_hz = 150.0
/// max_hz = 900.0
///
/// [normalization]
/// target_rms_db = -18.0
/// peak_ceiling_db = -1.0
///
/// [join]
/// join_duration = 0.05
/// strategy = "both"
///
/// [spectrogram]
/// max_freq = 8000.0
///
/// [cache]
/// processed_buffers = 20
/// loudness = 200
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Formant tracking.
    pub formant: FormantOptions,
    /// Default measurement range for loudness requests.
    pub loudness: LoudnessRange,
    /// Normalization target and limits.
    pub normalization: NormalizationOptions,
    /// Join level matching.
    pub join: JoinOptions,
    /// Spectrogram display.
    pub spectrogram: SpectrogramOptions,
    /// Cache sizes.
    pub cache: CacheCapacity,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from `path`, or the defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Every out-of-range value, as human readable messages.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut check = |ok: bool, msg: String| {
            if !ok {
                problems.push(msg);
            }
        };

        let f = &self.formant;
        check(
            f.fft_size.is_power_of_two(),
            format!("formant.fft_size must be a power of two, got {}", f.fft_size),
        );
        check(f.hop_size != Some(0), "formant.hop_size must be > 0".to_string());
        check(
            f.lifter_order != Some(0),
            "formant.lifter_order must be > 0".to_string(),
        );
        check(
            f.energy_threshold.is_finite() && f.energy_threshold >= 0.0,
            format!("formant.energy_threshold must be >= 0, got {}", f.energy_threshold),
        );
        let bands = [("f1_band", f.f1_band), ("f2_band", f.f2_band), ("f3_band", f.f3_band)];
        for (name, band) in bands {
            check(band_is_valid(band), format!("formant.{name} must have min_hz < max_hz"));
        }
        check(
            positive(f.max_display_freq),
            "formant.max_display_freq must be > 0".to_string(),
        );

        let n = &self.normalization;
        check(
            n.min_gain_db <= n.max_gain_db,
            format!(
                "normalization.min_gain_db ({}) must not exceed max_gain_db ({})",
                n.min_gain_db, n.max_gain_db
            ),
        );

        let j = &self.join;
        check(
            j.join_duration.is_finite() && j.join_duration > 0.0,
            "join.join_duration must be > 0".to_string(),
        );
        check(
            j.max_correction_db.is_finite() && j.max_correction_db >= 0.0,
            "join.max_correction_db must be >= 0".to_string(),
        );

        let s = &self.spectrogram;
        check(
            s.fft_size.is_power_of_two(),
            format!("spectrogram.fft_size must be a power of two, got {}", s.fft_size),
        );
        check(s.hop_size != Some(0), "spectrogram.hop_size must be > 0".to_string());
        check(positive(s.max_freq), "spectrogram.max_freq must be > 0".to_string());
        check(
            positive(s.dynamic_range_db),
            "spectrogram.dynamic_range_db must be > 0".to_string(),
        );

        check(
            self.cache.processed_buffers > 0,
            "cache.processed_buffers must be > 0".to_string(),
        );
        check(self.cache.loudness > 0, "cache.loudness must be > 0".to_string());

        problems
    }

    /// Fail with every problem found, or succeed if there are none.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::validation(&problems))
        }
    }
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

fn band_is_valid(band: Band) -> bool {
    band.min_hz.is_finite() && band.max_hz.is_finite() && band.min_hz < band.max_hz
}
