//! Whole-clip formant tracking.
//!
//! Each hop-aligned frame is windowed, gated on RMS energy, smoothed into a
//! cepstral envelope and searched for F1/F2/F3 in three overlapping bands.
//!
//! Confidence needs an amplitude scale, and recordings differ too much in
//! level for a fixed one. Tracking therefore runs in two passes: the first
//! collects raw peaks and the largest peak amplitude anywhere in the clip,
//! the second rates every peak by its linear magnitude relative to that
//! maximum. Envelope values are natural-log magnitudes and go negative on
//! quiet clips, so the ratio is taken after leaving the log domain.

use serde::{Deserialize, Serialize};

use crate::envelope::EnvelopeExtractor;
use crate::error::{Error, Result};
use crate::math::rms;
use crate::peaks::{Band, EnvelopePeak, strongest_peak};
use crate::window::{WindowCache, apply_window};

/// Tunables for [`FormantTracker`].
///
/// `hop_size` and `lifter_order` default to values derived from the sample
/// rate (10 ms and `sample_rate / 1000`) when left as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormantOptions {
    /// Analysis frame length; must be a power of two.
    pub fft_size: usize,
    /// Samples between frame starts.
    pub hop_size: Option<usize>,
    /// Cepstral lifter cutoff in quefrency bins.
    pub lifter_order: Option<usize>,
    /// Windowed-frame RMS below which a frame counts as unvoiced.
    pub energy_threshold: f32,
    /// Search band for the first formant.
    pub f1_band: Band,
    /// Search band for the second formant.
    pub f2_band: Band,
    /// Search band for the third formant.
    pub f3_band: Band,
    /// Reported frequencies are clamped to this ceiling.
    pub max_display_freq: f32,
}

impl Default for FormantOptions {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: None,
            lifter_order: None,
            energy_threshold: 0.005,
            f1_band: Band::new(150.0, 900.0),
            f2_band: Band::new(700.0, 2800.0),
            f3_band: Band::new(1800.0, 4000.0),
            max_display_freq: 8000.0,
        }
    }
}

impl FormantOptions {
    /// Hop size in samples for `sample_rate`.
    pub fn resolved_hop_size(&self, sample_rate: u32) -> usize {
        self.hop_size
            .unwrap_or_else(|| (f64::from(sample_rate) * 0.01).round() as usize)
    }

    /// Lifter order for `sample_rate`, never below 1.
    pub fn resolved_lifter_order(&self, sample_rate: u32) -> usize {
        self.lifter_order
            .unwrap_or_else(|| (f64::from(sample_rate) / 1000.0).round() as usize)
            .max(1)
    }
}

/// Formant estimates for one frame. Missing formants are reported as 0 Hz
/// with zero confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormantFrame {
    /// Start of the frame in seconds.
    pub time_seconds: f64,
    /// First formant in Hz.
    pub f1: f32,
    /// Second formant in Hz.
    pub f2: f32,
    /// Third formant in Hz.
    pub f3: f32,
    /// F1 confidence in `[0, 1]`.
    pub f1_confidence: f32,
    /// F2 confidence in `[0, 1]`.
    pub f2_confidence: f32,
    /// F3 confidence in `[0, 1]`.
    pub f3_confidence: f32,
}

/// Result of tracking a whole clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormantAnalysis {
    /// One frame per hop, ascending in time.
    pub frames: Vec<FormantFrame>,
    /// Sample rate of the analysed clip.
    pub sample_rate: u32,
    /// Frame length used.
    pub fft_size: usize,
    /// Hop size used.
    pub hop_size: usize,
    /// Clip length in seconds.
    pub duration_seconds: f64,
}

/// Number of frames produced for `num_samples`.
///
/// `floor((N - fft_size) / hop) + 1`, or zero when the clip is shorter than
/// one frame.
pub fn frame_count(num_samples: usize, fft_size: usize, hop_size: usize) -> usize {
    if hop_size == 0 || num_samples < fft_size {
        0
    } else {
        (num_samples - fft_size) / hop_size + 1
    }
}

/// First-pass frame state.
enum RawFrame {
    Unvoiced,
    Voiced([Option<EnvelopePeak>; 3]),
}

/// Formant tracker bound to one sample rate and option set.
#[derive(Debug)]
pub struct FormantTracker {
    options: FormantOptions,
    sample_rate: u32,
    hop_size: usize,
    extractor: EnvelopeExtractor,
    frame_buf: Vec<f32>,
}

impl FormantTracker {
    /// Create a tracker.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for a zero sample rate or hop size,
    /// [`Error::NonPowerOfTwo`] for a bad FFT size.
    pub fn new(sample_rate: u32, options: FormantOptions) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invalid("sample_rate", "must be non-zero"));
        }
        let hop_size = options.resolved_hop_size(sample_rate);
        if hop_size == 0 {
            return Err(Error::invalid("hop_size", "must be non-zero"));
        }
        let extractor =
            EnvelopeExtractor::new(options.fft_size, options.resolved_lifter_order(sample_rate))?;
        Ok(Self {
            frame_buf: Vec::with_capacity(options.fft_size),
            options,
            sample_rate,
            hop_size,
            extractor,
        })
    }

    /// Options in effect.
    pub fn options(&self) -> &FormantOptions {
        &self.options
    }

    /// Hop size in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Track formants across `samples`.
    ///
    /// Silent frames are not errors: they come back with all-zero formants
    /// and confidences.
    ///
    /// # Errors
    /// [`Error::InsufficientData`] if `samples` is shorter than one frame.
    pub fn analyze(
        &mut self,
        samples: &[f32],
        windows: &mut WindowCache,
    ) -> Result<FormantAnalysis> {
        let fft_size = self.options.fft_size;
        let num_frames = frame_count(samples.len(), fft_size, self.hop_size);
        if num_frames == 0 {
            return Err(Error::InsufficientData {
                required: fft_size,
                available: samples.len(),
            });
        }

        let window = windows.hann(fft_size);
        let bands = [self.options.f1_band, self.options.f2_band, self.options.f3_band];
        let sample_rate = self.sample_rate as f32;

        let mut raw = Vec::with_capacity(num_frames);
        let mut global_max = f32::NEG_INFINITY;
        for i in 0..num_frames {
            let start = i * self.hop_size;
            apply_window(&samples[start..start + fft_size], &window, &mut self.frame_buf);

            if rms(&self.frame_buf) < self.options.energy_threshold {
                raw.push(RawFrame::Unvoiced);
                continue;
            }

            let envelope = self.extractor.extract(&self.frame_buf)?;
            let peaks = bands
                .map(|band| strongest_peak(envelope.values(), sample_rate, fft_size, band));
            for peak in peaks.iter().flatten() {
                global_max = global_max.max(peak.amplitude);
            }
            raw.push(RawFrame::Voiced(peaks));
        }

        let max_freq = self.options.max_display_freq;
        let confidence = |peak: &Option<EnvelopePeak>| -> (f32, f32) {
            match peak {
                Some(p) => {
                    // exp(a) / exp(max) without overflowing either term
                    let c = if global_max.is_finite() {
                        (p.amplitude - global_max).exp().clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    (p.frequency_hz.min(max_freq), c)
                }
                None => (0.0, 0.0),
            }
        };

        let hop_seconds = self.hop_size as f64 / f64::from(self.sample_rate);
        let frames: Vec<FormantFrame> = raw
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let time_seconds = i as f64 * hop_seconds;
                match frame {
                    RawFrame::Unvoiced => FormantFrame {
                        time_seconds,
                        ..FormantFrame::default()
                    },
                    RawFrame::Voiced([p1, p2, p3]) => {
                        let (f1, f1_confidence) = confidence(p1);
                        let (f2, f2_confidence) = confidence(p2);
                        let (f3, f3_confidence) = confidence(p3);
                        FormantFrame {
                            time_seconds,
                            f1,
                            f2,
                            f3,
                            f1_confidence,
                            f2_confidence,
                            f3_confidence,
                        }
                    }
                }
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            frames = frames.len(),
            voiced = raw.iter().filter(|f| matches!(f, RawFrame::Voiced(_))).count(),
            global_max,
            "formant analysis complete"
        );

        Ok(FormantAnalysis {
            frames,
            sample_rate: self.sample_rate,
            fft_size,
            hop_size: self.hop_size,
            duration_seconds: samples.len() as f64 / f64::from(self.sample_rate),
        })
    }
}

/// One-shot formant tracking with a throwaway window cache.
pub fn track_formants(
    samples: &[f32],
    sample_rate: u32,
    options: &FormantOptions,
) -> Result<FormantAnalysis> {
    let mut windows = WindowCache::new();
    FormantTracker::new(sample_rate, options.clone())?.analyze(samples, &mut windows)
}
