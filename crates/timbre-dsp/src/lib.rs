//! Timbre DSP - Spectral analysis and level matching for recorded voice
//!
//! This crate provides the numeric core of a sample editor:
//!
//! - [`transform`] - In-place radix-2 FFT
//! - [`window`] - Hann windows and a per-size cache
//! - [`envelope`] - Cepstral spectral envelope extraction
//! - [`peaks`] - Band-limited envelope peak picking
//! - [`formant`] - Frame-by-frame F1/F2/F3 tracking
//! - [`loudness`] - RMS, peak and crest over a time range
//! - [`gain`] - Normalization gain toward a target level
//! - [`join`] - Gain correction at the boundary between two clips
//! - [`spectrogram`] - Normalized STFT magnitude matrix for display
//! - [`cache`] - LRU caches for processed buffers and loudness results
//! - [`context`] - Owner of windows and caches for one execution context
//!
//! All state is owned explicitly. There are no globals; a host creates a
//! [`DspContext`] per thread or worker and passes it where needed.
//!
//! ## Formants
//!
//! ```rust
//! use timbre_dsp::{FormantOptions, track_formants};
//!
//! let samples: Vec<f32> = (0..8000)
//!     .map(|i| (i as f32 * 0.07).sin() * 0.3)
//!     .collect();
//! let analysis = track_formants(&samples, 16000, &FormantOptions::default()).unwrap();
//! assert!(!analysis.frames.is_empty());
//! ```
//!
//! ## Level matching
//!
//! ```rust
//! use timbre_dsp::{AudioBuffer, JoinOptions, join_correction};
//!
//! let loud = AudioBuffer::mono(vec![0.2; 48000], 48000);
//! let quiet = AudioBuffer::mono(vec![0.1; 48000], 48000);
//! let correction = join_correction(&loud, &quiet, &JoinOptions::default());
//! assert!(correction.gain_a < 1.0 && correction.gain_b > 1.0);
//! ```

pub mod buffer;
pub mod cache;
pub mod context;
pub mod envelope;
pub mod error;
pub mod formant;
pub mod gain;
pub mod join;
pub mod loudness;
pub mod math;
pub mod peaks;
pub mod spectrogram;
pub mod transform;
pub mod window;

pub use buffer::AudioBuffer;
pub use cache::{
    CacheCapacity, LoudnessCache, LruCache, ProcessedBufferCache, ProcessingParams, fingerprint,
};
pub use context::{DspContext, Eviction};
pub use envelope::{EnvelopeExtractor, SpectralEnvelope};
pub use error::{Error, Result};
pub use formant::{FormantAnalysis, FormantFrame, FormantOptions, FormantTracker, track_formants};
pub use gain::{NormalizationOptions, normalization_gain, normalization_gain_db};
pub use join::{JoinGainCorrection, JoinOptions, JoinStrategy, join_correction};
pub use loudness::{LoudnessAnalysis, LoudnessRange, analyze_loudness};
pub use math::{apply_gain, db_to_linear, linear_to_db};
pub use peaks::{Band, EnvelopePeak, find_peaks};
pub use spectrogram::{Spectrogram, SpectrogramOptions, compute_spectrogram};
pub use transform::{Complex32, Direction, fft_in_place};
pub use window::{WindowCache, hann};
