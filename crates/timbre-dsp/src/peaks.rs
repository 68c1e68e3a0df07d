//! Local-maximum detection in spectral envelopes.

use serde::{Deserialize, Serialize};

/// Frequency search band, `[min_hz, max_hz)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Inclusive lower edge in Hz.
    pub min_hz: f32,
    /// Exclusive upper edge in Hz.
    pub max_hz: f32,
}

impl Band {
    /// Create a band.
    pub const fn new(min_hz: f32, max_hz: f32) -> Self {
        Self { min_hz, max_hz }
    }

    /// True if `hz` falls inside the band.
    pub fn contains(&self, hz: f32) -> bool {
        hz >= self.min_hz && hz < self.max_hz
    }
}

/// A refined local maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePeak {
    /// Fractional bin position after interpolation.
    pub bin: f32,
    /// Frequency of `bin` in Hz.
    pub frequency_hz: f32,
    /// Interpolated envelope value at the peak.
    pub amplitude: f32,
}

/// Parabolic vertex through three equally spaced points.
///
/// Returns `(offset, height)` where `offset` is relative to the centre point
/// and clamped to ±0.5 bins. A flat neighbourhood yields a zero offset.
#[inline]
pub fn parabolic_interpolation(alpha: f32, beta: f32, gamma: f32) -> (f32, f32) {
    let denom = alpha - 2.0 * beta + gamma;
    if denom.abs() < 1e-12 {
        return (0.0, beta);
    }
    let offset = (0.5 * (alpha - gamma) / denom).clamp(-0.5, 0.5);
    (offset, beta - 0.25 * (alpha - gamma) * offset)
}

/// Find every local maximum of `envelope` inside `band`.
///
/// Only bins whose centre frequency lies in the band are candidates, and the
/// first and last bins are never candidates because they lack a neighbour.
/// A candidate must be strictly greater than both neighbours. Results are
/// sorted by amplitude, strongest first.
pub fn find_peaks(
    envelope: &[f32],
    sample_rate: f32,
    fft_size: usize,
    band: Band,
) -> Vec<EnvelopePeak> {
    let len = envelope.len();
    if len < 3 || fft_size == 0 || sample_rate <= 0.0 {
        return Vec::new();
    }
    let bin_width = sample_rate / fft_size as f32;

    let first = ((band.min_hz / bin_width).ceil().max(1.0)) as usize;
    let mut peaks: Vec<EnvelopePeak> = (first..len - 1)
        .take_while(|&k| (k as f32 * bin_width) < band.max_hz)
        .filter(|&k| envelope[k] > envelope[k - 1] && envelope[k] > envelope[k + 1])
        .map(|k| {
            let (offset, amplitude) =
                parabolic_interpolation(envelope[k - 1], envelope[k], envelope[k + 1]);
            let bin = k as f32 + offset;
            EnvelopePeak {
                bin,
                frequency_hz: bin * bin_width,
                amplitude,
            }
        })
        .collect();

    peaks.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
    peaks
}

/// Strongest peak in `band`, if any.
pub fn strongest_peak(
    envelope: &[f32],
    sample_rate: f32,
    fft_size: usize,
    band: Band,
) -> Option<EnvelopePeak> {
    find_peaks(envelope, sample_rate, fft_size, band).into_iter().next()
}
