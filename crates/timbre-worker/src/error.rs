//! Error types for the worker handle.

use thiserror::Error;

/// Errors surfaced by [`WorkerHandle`](crate::WorkerHandle).
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread has stopped and its channels are closed.
    #[error("worker thread is no longer running")]
    Disconnected,

    /// The settings passed to [`Worker::spawn`](crate::Worker::spawn) are inconsistent.
    #[error("invalid worker settings: {0}")]
    Config(#[from] timbre_config::ConfigError),

    /// The OS refused to start the worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
