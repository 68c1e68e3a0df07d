//! Bounded memoization of expensive results.
//!
//! - [`LruCache`] - generic recency-ordered map
//! - [`fingerprint`] - cheap buffer identity
//! - [`ProcessedBufferCache`] - pitch/time-processed buffers
//! - [`LoudnessCache`] - loudness measurements
//!
//! Caches are plain owned values with no interior locking. Each execution
//! context owns its own instances.

mod fingerprint;
mod loudness;
mod lru;
mod processed;

pub use fingerprint::{FINGERPRINT_SAMPLES, fingerprint};
pub use loudness::{DEFAULT_LOUDNESS_CAPACITY, LoudnessCache, loudness_key};
pub use lru::LruCache;
pub use processed::{DEFAULT_PROCESSED_CAPACITY, ProcessedBufferCache, ProcessingParams};

use serde::{Deserialize, Serialize};

/// Capacities for the caches owned by a [`DspContext`](crate::DspContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheCapacity {
    /// Maximum processed buffers.
    pub processed_buffers: usize,
    /// Maximum loudness measurements.
    pub loudness: usize,
}

impl Default for CacheCapacity {
    fn default() -> Self {
        Self {
            processed_buffers: DEFAULT_PROCESSED_CAPACITY,
            loudness: DEFAULT_LOUDNESS_CAPACITY,
        }
    }
}
