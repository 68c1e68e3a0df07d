//! Loudness normalization gain.
//!
//! Priority when the constraints conflict: never clip past the peak
//! ceiling, then never attenuate below the gain floor, then hit the RMS
//! target as closely as the first two allow.

use serde::{Deserialize, Serialize};

use crate::loudness::LoudnessAnalysis;
use crate::math::db_to_linear;

/// Normalization target and limits, all in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationOptions {
    /// Desired RMS level in dBFS.
    pub target_rms_db: f32,
    /// Lowest gain that may be applied.
    pub min_gain_db: f32,
    /// Highest gain that may be applied.
    pub max_gain_db: f32,
    /// Resulting peak may not exceed this level in dBFS.
    pub peak_ceiling_db: f32,
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self {
            target_rms_db: -18.0,
            min_gain_db: -12.0,
            max_gain_db: 12.0,
            peak_ceiling_db: -1.0,
        }
    }
}

/// Gain in dB that brings `analysis` toward the target.
///
/// Silent input returns 0 dB so the noise floor is never boosted. Inverted
/// gain bounds are swapped and a NaN bound counts as 0 dB.
pub fn normalization_gain_db(analysis: &LoudnessAnalysis, options: &NormalizationOptions) -> f32 {
    if !analysis.has_content {
        return 0.0;
    }

    let (floor, ceiling) = gain_bounds(options);
    let mut gain_db = (options.target_rms_db - analysis.rms_db).clamp(floor, ceiling);

    if analysis.peak_db + gain_db > options.peak_ceiling_db {
        gain_db = (options.peak_ceiling_db - analysis.peak_db).max(floor);
    }
    if gain_db.is_finite() { gain_db } else { 0.0 }
}

fn gain_bounds(options: &NormalizationOptions) -> (f32, f32) {
    let nan_as_zero = |db: f32| if db.is_nan() { 0.0 } else { db };
    let min = nan_as_zero(options.min_gain_db);
    let max = nan_as_zero(options.max_gain_db);
    (min.min(max), min.max(max))
}

/// Linear normalization gain. Exactly 1.0 for silent input.
pub fn normalization_gain(analysis: &LoudnessAnalysis, options: &NormalizationOptions) -> f32 {
    if !analysis.has_content {
        return 1.0;
    }
    db_to_linear(normalization_gain_db(analysis, options))
}
