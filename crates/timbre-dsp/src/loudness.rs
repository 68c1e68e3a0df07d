//! RMS, peak and crest-factor measurement.
//!
//! Analysis never fails: empty buffers, silent ranges and inverted or
//! non-finite time ranges all produce [`LoudnessAnalysis::SILENT`].

use serde::{Deserialize, Serialize};

use crate::buffer::AudioBuffer;
use crate::math::linear_to_db;

/// RMS at or below this level counts as silence.
pub const SILENCE_THRESHOLD: f32 = 1e-6;

/// Which part of a buffer to measure.
///
/// Times are in seconds; `None` means the start or end of the buffer.
/// The channel index is clamped to the channels actually present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessRange {
    /// Inclusive start time.
    pub start_time: Option<f64>,
    /// Exclusive end time.
    pub end_time: Option<f64>,
    /// Channel to measure.
    pub channel: usize,
}

impl LoudnessRange {
    /// The whole of channel 0.
    pub fn full() -> Self {
        Self::default()
    }

    /// `[start, end)` of channel 0.
    pub fn between(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            channel: 0,
        }
    }

    /// Same range on another channel.
    pub fn on_channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    /// Resolve to a sample index range, or `None` when nothing would be measured.
    pub fn sample_range(&self, len: usize, sample_rate: u32) -> Option<(usize, usize)> {
        if len == 0 || sample_rate == 0 {
            return None;
        }
        let sr = f64::from(sample_rate);
        let start = self.start_time.unwrap_or(0.0);
        let end = self.end_time.unwrap_or(len as f64 / sr);
        if !start.is_finite() || !end.is_finite() {
            return None;
        }
        // nearest sample, so `duration - d` lands on a boundary despite rounding
        let to_index = |t: f64| ((t * sr).round().max(0.0) as usize).min(len);
        let (s, e) = (to_index(start), to_index(end));
        (e > s).then_some((s, e))
    }
}

/// Level measurements for one range of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoudnessAnalysis {
    /// Linear RMS.
    pub rms: f32,
    /// RMS in dBFS, `-inf` for silence.
    pub rms_db: f32,
    /// Largest absolute sample.
    pub peak: f32,
    /// Peak in dBFS, `-inf` for silence.
    pub peak_db: f32,
    /// `peak / rms`, or 0 for silence.
    pub crest_factor: f32,
    /// RMS exceeds [`SILENCE_THRESHOLD`].
    pub has_content: bool,
}

impl LoudnessAnalysis {
    /// Result for silent, empty or invalid input.
    pub const SILENT: Self = Self {
        rms: 0.0,
        rms_db: f32::NEG_INFINITY,
        peak: 0.0,
        peak_db: f32::NEG_INFINITY,
        crest_factor: 0.0,
        has_content: false,
    };
}

/// Measure a slice in a single pass.
pub fn analyze_samples(samples: &[f32]) -> LoudnessAnalysis {
    if samples.is_empty() {
        return LoudnessAnalysis::SILENT;
    }

    let mut sum_sq = 0.0f64;
    let mut peak = 0.0f32;
    for &s in samples {
        sum_sq += f64::from(s) * f64::from(s);
        peak = peak.max(s.abs());
    }
    let rms = (sum_sq / samples.len() as f64).sqrt() as f32;
    let has_content = rms > SILENCE_THRESHOLD;

    LoudnessAnalysis {
        rms,
        rms_db: linear_to_db(rms),
        peak,
        peak_db: linear_to_db(peak),
        crest_factor: if has_content { peak / rms } else { 0.0 },
        has_content,
    }
}

/// Measure `range` of `buffer`.
pub fn analyze_loudness(buffer: &AudioBuffer, range: &LoudnessRange) -> LoudnessAnalysis {
    let samples = buffer.channel(range.channel);
    match range.sample_range(samples.len(), buffer.sample_rate()) {
        Some((start, end)) => analyze_samples(&samples[start..end]),
        None => LoudnessAnalysis::SILENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn zeros_are_silent() {
        let a = analyze_samples(&[0.0; 1024]);
        assert_eq!(a.rms, 0.0);
        assert_eq!(a.rms_db, f32::NEG_INFINITY);
        assert_eq!(a.peak_db, f32::NEG_INFINITY);
        assert_eq!(a.crest_factor, 0.0);
        assert!(!a.has_content);
    }

    #[test]
    fn full_scale_sine() {
        // 1 kHz at 48 kHz: exactly 48 samples per period
        let a = analyze_samples(&sine(1000.0, 48000, 48000, 1.0));
        assert!((a.rms_db + 3.0103).abs() < 0.01, "rms_db {}", a.rms_db);
        assert!((a.crest_factor - std::f32::consts::SQRT_2).abs() < 0.01);
        assert!((a.peak - 1.0).abs() < 1e-3);
        assert!(a.has_content);
    }

    #[test]
    fn sub_range_measures_only_that_part() {
        let mut samples = vec![0.0; 48000];
        samples[24000..].iter_mut().for_each(|s| *s = 0.5);
        let buf = AudioBuffer::mono(samples, 48000);

        let first = analyze_loudness(&buf, &LoudnessRange::between(0.0, 0.5));
        assert!(!first.has_content);

        let second = analyze_loudness(&buf, &LoudnessRange::between(0.5, 1.0));
        assert!((second.rms - 0.5).abs() < 1e-6);
        assert!((second.crest_factor - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_ranges_are_silent() {
        let buf = AudioBuffer::mono(vec![0.5; 1000], 1000);
        for range in [
            LoudnessRange::between(0.8, 0.2),
            LoudnessRange::between(0.5, 0.5),
            LoudnessRange::between(2.0, 3.0),
            LoudnessRange::between(f64::NAN, 1.0),
        ] {
            assert_eq!(analyze_loudness(&buf, &range), LoudnessAnalysis::SILENT);
        }
        let empty = AudioBuffer::mono(Vec::new(), 1000);
        assert_eq!(
            analyze_loudness(&empty, &LoudnessRange::full()),
            LoudnessAnalysis::SILENT
        );
    }

    #[test]
    fn range_clamps_to_buffer() {
        let buf = AudioBuffer::mono(vec![0.25; 1000], 1000);
        let a = analyze_loudness(&buf, &LoudnessRange::between(-5.0, 50.0));
        assert!((a.rms - 0.25).abs() < 1e-6);
    }

    #[test]
    fn channel_clamped() {
        let buf = AudioBuffer::from_channels(vec![vec![0.0; 100], vec![0.5; 100]], 100).unwrap();
        let a = analyze_loudness(&buf, &LoudnessRange::full().on_channel(9));
        assert!((a.peak - 0.5).abs() < 1e-6);
    }
}
