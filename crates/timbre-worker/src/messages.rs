//! Request and reply types exchanged with the worker.
//!
//! The spectrogram request and response are the serialized boundary shared
//! with hosts that marshal data as JSON, so their field names are fixed
//! (`channelData`, `sampleRate`, `fftSize`, `maxFreq`, `spectrogramData`,
//! `numBins`, `numFrames`, `error`). The remaining requests carry typed values
//! from `timbre-dsp` directly.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use timbre_dsp::{
    AudioBuffer, Error, Eviction, FormantAnalysis, FormantOptions, JoinGainCorrection,
    LoudnessAnalysis, LoudnessRange, Spectrogram, SpectrogramOptions,
};

/// Failure text for a clip shorter than one spectrogram window.
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Not enough audio data for spectrogram";

/// Identifies one submitted request.
///
/// Ids increase monotonically per handle, so a caller that only cares about
/// its latest request can drop any reply with a smaller id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Spectrogram request as sent over the message boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrogramRequest {
    /// Mono samples.
    pub channel_data: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// FFT size, configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fft_size: Option<usize>,
    /// Highest frequency kept, configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_freq: Option<f32>,
}

impl SpectrogramRequest {
    /// Request with default FFT size and frequency limit.
    pub fn new(channel_data: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channel_data,
            sample_rate,
            fft_size: None,
            max_freq: None,
        }
    }

    /// Override the FFT size.
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = Some(fft_size);
        self
    }

    /// Override the frequency limit.
    pub fn with_max_freq(mut self, max_freq: f32) -> Self {
        self.max_freq = Some(max_freq);
        self
    }

    /// Options for this request on top of `defaults`.
    pub fn options(&self, defaults: &SpectrogramOptions) -> SpectrogramOptions {
        SpectrogramOptions {
            fft_size: self.fft_size.unwrap_or(defaults.fft_size),
            max_freq: self.max_freq.unwrap_or(defaults.max_freq),
            ..*defaults
        }
    }
}

/// Successful spectrogram payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrogramData {
    /// Per-frame magnitudes in `[0, 1]`.
    pub spectrogram_data: Vec<Vec<f32>>,
    /// Bins per frame.
    pub num_bins: usize,
    /// Number of frames.
    pub num_frames: usize,
}

/// Spectrogram reply: either the data or a single error string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpectrogramResponse {
    /// Computed spectrogram.
    Success(SpectrogramData),
    /// Nothing was computed.
    Failure {
        /// Human readable reason.
        error: String,
    },
}

impl SpectrogramResponse {
    /// True for [`SpectrogramResponse::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<Spectrogram, Error>> for SpectrogramResponse {
    fn from(result: Result<Spectrogram, Error>) -> Self {
        match result {
            Ok(spec) => Self::Success(SpectrogramData {
                num_bins: spec.num_bins,
                num_frames: spec.num_frames,
                spectrogram_data: spec.data,
            }),
            Err(Error::InsufficientData { .. }) => Self::Failure {
                error: INSUFFICIENT_DATA_MESSAGE.to_string(),
            },
            Err(err) => Self::Failure {
                error: err.to_string(),
            },
        }
    }
}

/// Work for the worker thread.
#[derive(Debug, Clone)]
pub enum Request {
    /// Compute a display spectrogram.
    Spectrogram(SpectrogramRequest),
    /// Track formants over a mono clip.
    Formants {
        /// Mono samples.
        samples: Vec<f32>,
        /// Sample rate in Hz.
        sample_rate: u32,
        /// Configured formant options when `None`.
        options: Option<FormantOptions>,
    },
    /// Measure loudness and the normalization gain that goes with it.
    Loudness {
        /// Buffer to measure.
        buffer: Arc<AudioBuffer>,
        /// Configured default range when `None`.
        range: Option<LoudnessRange>,
    },
    /// Level correction for the join between two clips.
    JoinCorrection {
        /// Outgoing clip.
        a: Arc<AudioBuffer>,
        /// Incoming clip.
        b: Arc<AudioBuffer>,
    },
    /// Empty the worker's result caches.
    ClearCaches,
    /// Stop the worker after the requests already queued.
    Shutdown,
}

impl Request {
    /// Short name used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spectrogram(_) => "spectrogram",
            Self::Formants { .. } => "formants",
            Self::Loudness { .. } => "loudness",
            Self::JoinCorrection { .. } => "join_correction",
            Self::ClearCaches => "clear_caches",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Spectrogram data or its error string.
    Spectrogram(SpectrogramResponse),
    /// Formant track.
    Formants(FormantAnalysis),
    /// Loudness with its normalization gain.
    Loudness {
        /// Measurement.
        analysis: LoudnessAnalysis,
        /// Linear normalization gain under the configured limits.
        gain: f32,
    },
    /// Join gains.
    JoinCorrection(JoinGainCorrection),
    /// Caches were emptied.
    CachesCleared,
    /// The request failed without output.
    Failed(Error),
}

/// A response paired with the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Id returned by `submit`.
    pub id: RequestId,
    /// Outcome.
    pub response: Response,
}

/// Notifications published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// A request produced a result.
    RequestCompleted {
        /// Request id.
        id: RequestId,
        /// Request kind.
        kind: &'static str,
        /// Time spent computing.
        elapsed: Duration,
    },
    /// A request failed.
    RequestFailed {
        /// Request id.
        id: RequestId,
        /// Request kind.
        kind: &'static str,
        /// Error text.
        error: String,
    },
    /// A cache dropped an entry to stay within capacity.
    CacheEvicted(Eviction),
    /// All result caches were emptied.
    CachesCleared,
}
