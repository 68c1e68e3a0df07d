//! STFT spectrogram for display.
//!
//! Magnitudes are converted to dB and mapped into `[0, 1]` over a fixed
//! dynamic range below the loudest bin of the whole clip, so frames are
//! comparable with each other.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transform::{Complex32, Direction, fft_in_place};
use crate::window::WindowCache;

/// Spectrogram settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramOptions {
    /// Frame length; must be a power of two.
    pub fft_size: usize,
    /// Highest frequency kept, in Hz.
    pub max_freq: f32,
    /// Samples between frames, `fft_size / 4` when `None`.
    pub hop_size: Option<usize>,
    /// Range below the clip maximum mapped onto `[0, 1]`, in dB.
    pub dynamic_range_db: f32,
}

impl Default for SpectrogramOptions {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            max_freq: 8000.0,
            hop_size: None,
            dynamic_range_db: 80.0,
        }
    }
}

impl SpectrogramOptions {
    /// Hop size in samples.
    pub fn resolved_hop_size(&self) -> usize {
        self.hop_size.unwrap_or(self.fft_size / 4).max(1)
    }
}

/// Normalized magnitudes, `data[frame][bin]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Per-frame values in `[0, 1]`.
    pub data: Vec<Vec<f32>>,
    /// FFT size used.
    pub fft_size: usize,
    /// Hop size between frames.
    pub hop_size: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of frames.
    pub num_frames: usize,
    /// Bins kept per frame, DC through `max_freq`.
    pub num_bins: usize,
}

impl Spectrogram {
    /// Centre frequency of `bin` in Hz.
    pub fn bin_to_freq(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// Start time of `frame` in seconds.
    pub fn frame_to_time(&self, frame: usize) -> f32 {
        frame as f32 * self.hop_size as f32 / self.sample_rate as f32
    }

    /// Value at `frame`, `bin`.
    pub fn get(&self, frame: usize, bin: usize) -> Option<f32> {
        self.data.get(frame).and_then(|f| f.get(bin)).copied()
    }

    /// One frame.
    pub fn get_frame(&self, frame: usize) -> Option<&[f32]> {
        self.data.get(frame).map(|v| v.as_slice())
    }

    /// Loudest bin of `frame`, in Hz.
    pub fn peak_frequency(&self, frame: usize) -> Option<f32> {
        let (bin, _) = self
            .get_frame(frame)?
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
        Some(self.bin_to_freq(bin))
    }
}

/// Bins from DC up to and including `max_freq`, capped at Nyquist.
pub fn bins_up_to(max_freq: f32, sample_rate: u32, fft_size: usize) -> usize {
    let bin_width = sample_rate as f32 / fft_size as f32;
    let last = (max_freq.max(0.0) / bin_width).floor() as usize;
    (last + 1).min(fft_size / 2 + 1)
}

/// Compute a normalized spectrogram of `samples`.
///
/// # Errors
/// [`Error::InsufficientData`] with fewer samples than one frame,
/// [`Error::NonPowerOfTwo`] for a bad FFT size,
/// [`Error::InvalidParameter`] for a zero sample rate.
pub fn compute_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    options: &SpectrogramOptions,
    windows: &mut WindowCache,
) -> Result<Spectrogram> {
    let fft_size = options.fft_size;
    if !fft_size.is_power_of_two() {
        return Err(Error::NonPowerOfTwo { len: fft_size });
    }
    if sample_rate == 0 {
        return Err(Error::invalid("sample_rate", "must be non-zero"));
    }
    if samples.len() < fft_size {
        return Err(Error::InsufficientData {
            required: fft_size,
            available: samples.len(),
        });
    }

    let hop_size = options.resolved_hop_size();
    let num_frames = (samples.len() - fft_size) / hop_size + 1;
    let num_bins = bins_up_to(options.max_freq, sample_rate, fft_size);
    let window = windows.hann(fft_size);

    let mut buffer = vec![Complex32::new(0.0, 0.0); fft_size];
    let mut data = Vec::with_capacity(num_frames);
    let mut max_db = f32::NEG_INFINITY;
    for frame in 0..num_frames {
        let start = frame * hop_size;
        for ((c, &s), &w) in buffer
            .iter_mut()
            .zip(&samples[start..start + fft_size])
            .zip(window.iter())
        {
            *c = Complex32::new(s * w, 0.0);
        }
        fft_in_place(&mut buffer, Direction::Forward)?;

        let row: Vec<f32> = buffer[..num_bins]
            .iter()
            .map(|c| 20.0 * (c.norm() + 1e-10).log10())
            .collect();
        for &db in &row {
            max_db = max_db.max(db);
        }
        data.push(row);
    }

    let range = options.dynamic_range_db.max(1e-3);
    // max_db of -200 means every bin sat on the epsilon floor
    let silent = max_db <= -199.0;
    let floor = max_db - range;
    for row in &mut data {
        for v in row.iter_mut() {
            *v = if silent {
                0.0
            } else {
                ((*v - floor) / range).clamp(0.0, 1.0)
            };
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(num_frames, num_bins, max_db, "spectrogram computed");

    Ok(Spectrogram {
        data,
        fft_size,
        hop_size,
        sample_rate,
        num_frames,
        num_bins,
    })
}
