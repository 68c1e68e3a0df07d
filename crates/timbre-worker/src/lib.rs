//! Background execution context for timbre analysis.
//!
//! Full-clip spectrograms and formant tracks take long enough to stall an
//! interactive thread, so they run on a dedicated worker that owns its own
//! [`DspContext`](timbre_dsp::DspContext). Work goes in as a [`Request`],
//! results come back as a [`Reply`] tagged with the [`RequestId`] that
//! `submit` returned.
//!
//! ```rust,no_run
//! use timbre_config::Settings;
//! use timbre_worker::{Request, Response, SpectrogramRequest, Worker};
//!
//! let worker = Worker::spawn(Settings::default()).unwrap();
//! let samples = vec![0.0f32; 44100];
//! let response = worker
//!     .call(Request::Spectrogram(SpectrogramRequest::new(samples, 44100)))
//!     .unwrap();
//! if let Response::Spectrogram(spec) = response {
//!     println!("{}", spec.is_success());
//! }
//! ```

mod error;
mod messages;
mod worker;

pub use error::WorkerError;
pub use messages::{
    INSUFFICIENT_DATA_MESSAGE, Reply, Request, RequestId, Response, SpectrogramData,
    SpectrogramRequest, SpectrogramResponse, WorkerEvent,
};
pub use worker::{THREAD_NAME, Worker, WorkerHandle, run_spectrogram};
