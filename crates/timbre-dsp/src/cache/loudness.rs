//! Memoized loudness measurements.

use super::fingerprint::fingerprint;
use super::lru::LruCache;
use crate::buffer::AudioBuffer;
use crate::loudness::{LoudnessAnalysis, LoudnessRange, analyze_loudness};

/// Default number of cached measurements.
pub const DEFAULT_LOUDNESS_CAPACITY: usize = 200;

/// Key for one measurement: buffer fingerprint, range rounded to the
/// microsecond, and channel.
pub fn loudness_key(fingerprint: &str, range: &LoudnessRange) -> String {
    let micros = |t: Option<f64>| match t {
        Some(t) if t.is_finite() => format!("{}", (t * 1e6).round() as i64),
        Some(_) => "nan".to_string(),
        None => "-".to_string(),
    };
    format!(
        "{fingerprint}|{}|{}|c{}",
        micros(range.start_time),
        micros(range.end_time),
        range.channel
    )
}

/// LRU cache in front of [`analyze_loudness`].
#[derive(Debug)]
pub struct LoudnessCache {
    cache: LruCache<String, LoudnessAnalysis>,
    evicted: Vec<String>,
    hits: u64,
    misses: u64,
}

impl LoudnessCache {
    /// Create a cache holding at most `capacity` measurements.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
            evicted: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Measure `range` of `buffer`, reusing an earlier result when possible.
    pub fn analyze(&mut self, buffer: &AudioBuffer, range: &LoudnessRange) -> LoudnessAnalysis {
        let key = loudness_key(&fingerprint(buffer), range);
        if let Some(hit) = self.cache.get(&key) {
            self.hits += 1;
            return *hit;
        }
        self.misses += 1;
        let analysis = analyze_loudness(buffer, range);
        if let Some((old, _)) = self.cache.insert(key, analysis) {
            #[cfg(feature = "tracing")]
            tracing::trace!(key = %old, "loudness analysis evicted");
            self.evicted.push(old);
        }
        analysis
    }

    /// Keys evicted since the last call.
    pub fn drain_evictions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.evicted)
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Number of cached measurements.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Drop every cached measurement.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for LoudnessCache {
    fn default() -> Self {
        Self::new(DEFAULT_LOUDNESS_CAPACITY)
    }
}
