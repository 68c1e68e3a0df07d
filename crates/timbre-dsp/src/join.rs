//! Level matching across the boundary where one sample ends and the next
//! begins.
//!
//! Only the last `join_duration` seconds of the outgoing sample and the first
//! `join_duration` seconds of the incoming one are measured. A correction is
//! only meaningful when both sides carry signal, so a silent side yields the
//! neutral result.

use serde::{Deserialize, Serialize};

use crate::buffer::AudioBuffer;
use crate::loudness::{LoudnessAnalysis, LoudnessRange, analyze_loudness};
use crate::math::{apply_gain, db_to_linear};

/// Which side of the join absorbs the correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JoinStrategy {
    /// Split the difference evenly between both sides.
    #[default]
    Both,
    /// Move only the outgoing sample.
    AdjustA,
    /// Move only the incoming sample.
    AdjustB,
}

/// Join correction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    /// Length of the measured region on each side, in seconds.
    pub join_duration: f64,
    /// Largest level difference that will be corrected, in dB.
    pub max_correction_db: f32,
    /// How the correction is distributed.
    pub strategy: JoinStrategy,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            join_duration: 0.05,
            max_correction_db: 6.0,
            strategy: JoinStrategy::Both,
        }
    }
}

/// Gains to apply to each side of a join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGainCorrection {
    /// Linear gain for the outgoing sample.
    pub gain_a: f32,
    /// Linear gain for the incoming sample.
    pub gain_b: f32,
    /// Measured `B - A` RMS difference in dB, before clamping.
    pub rms_diff_db: f32,
    /// Difference actually corrected after clamping.
    pub applied_correction_db: f32,
    /// Linear RMS of A's tail.
    pub rms_a: f32,
    /// Linear RMS of B's head.
    pub rms_b: f32,
}

impl JoinGainCorrection {
    /// No change on either side.
    pub const NEUTRAL: Self = Self {
        gain_a: 1.0,
        gain_b: 1.0,
        rms_diff_db: 0.0,
        applied_correction_db: 0.0,
        rms_a: 0.0,
        rms_b: 0.0,
    };

    /// Scale both sides in place.
    pub fn apply(&self, a: &mut [f32], b: &mut [f32]) {
        apply_gain(a, self.gain_a);
        apply_gain(b, self.gain_b);
    }

    /// True when neither side changes.
    pub fn is_neutral(&self) -> bool {
        self.gain_a == 1.0 && self.gain_b == 1.0
    }
}

/// Measured region at the end of `a`.
pub fn tail_range(a: &AudioBuffer, options: &JoinOptions) -> LoudnessRange {
    let end = a.duration_seconds();
    LoudnessRange::between((end - options.join_duration).max(0.0), end)
}

/// Measured region at the start of `b`.
pub fn head_range(b: &AudioBuffer, options: &JoinOptions) -> LoudnessRange {
    LoudnessRange::between(0.0, options.join_duration.min(b.duration_seconds()))
}

/// Correction from already-measured join regions.
pub fn correction_from_analyses(
    tail_a: &LoudnessAnalysis,
    head_b: &LoudnessAnalysis,
    options: &JoinOptions,
) -> JoinGainCorrection {
    if !tail_a.has_content || !head_b.has_content {
        return JoinGainCorrection {
            rms_a: tail_a.rms,
            rms_b: head_b.rms,
            ..JoinGainCorrection::NEUTRAL
        };
    }

    let rms_diff_db = head_b.rms_db - tail_a.rms_db;
    let limit = options.max_correction_db.abs();
    let limit = if limit.is_nan() { 0.0 } else { limit };
    let applied = rms_diff_db.clamp(-limit, limit);

    let (gain_a_db, gain_b_db) = match options.strategy {
        JoinStrategy::Both => (applied / 2.0, -applied / 2.0),
        JoinStrategy::AdjustA => (applied, 0.0),
        JoinStrategy::AdjustB => (0.0, -applied),
    };

    JoinGainCorrection {
        gain_a: db_to_linear(gain_a_db),
        gain_b: db_to_linear(gain_b_db),
        rms_diff_db,
        applied_correction_db: applied,
        rms_a: tail_a.rms,
        rms_b: head_b.rms,
    }
}

/// Measure both join regions and compute the correction.
pub fn join_correction(
    a: &AudioBuffer,
    b: &AudioBuffer,
    options: &JoinOptions,
) -> JoinGainCorrection {
    let tail = analyze_loudness(a, &tail_range(a, options));
    let head = analyze_loudness(b, &head_range(b, options));
    correction_from_analyses(&tail, &head, options)
}
