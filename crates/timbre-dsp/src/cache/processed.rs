//! Cache of pitch/time-processed buffers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::fingerprint::fingerprint;
use super::lru::LruCache;
use crate::buffer::AudioBuffer;

/// Default number of processed buffers kept.
pub const DEFAULT_PROCESSED_CAPACITY: usize = 20;

/// Parameters that change the output of the pitch/time processor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingParams {
    /// Pitch shift in semitones.
    pub pitch_semitones: f32,
    /// Time stretch ratio, 1.0 = unchanged.
    pub time_stretch: f32,
    /// Keep the spectral envelope in place while shifting pitch.
    pub preserve_formants: bool,
    /// Formant scale applied when `preserve_formants` is set.
    pub formant_scale: f32,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            pitch_semitones: 0.0,
            time_stretch: 1.0,
            preserve_formants: false,
            formant_scale: 1.0,
        }
    }
}

/// Round to `decimals` places and fold `-0` into `0`.
fn quantize(value: f32, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let q = (f64::from(value) * scale).round() / scale;
    if q == 0.0 { 0.0 } else { q }
}

impl ProcessingParams {
    /// Cache key for processing the buffer identified by `fingerprint`.
    ///
    /// Pitch is rounded to 0.01 semitone and stretch to 0.001. The formant
    /// segment is only present while formant preservation is on, so keys for
    /// plain pitch/time jobs keep their original shape.
    pub fn cache_key(&self, fingerprint: &str) -> String {
        let mut key = format!(
            "{fingerprint}|p{:.2}|t{:.3}",
            quantize(self.pitch_semitones, 2),
            quantize(self.time_stretch, 3)
        );
        if self.preserve_formants {
            key.push_str(&format!("|f1|fs{:.3}", quantize(self.formant_scale, 3)));
        }
        key
    }
}

/// LRU cache of processed buffers keyed by source fingerprint and parameters.
#[derive(Debug)]
pub struct ProcessedBufferCache {
    cache: LruCache<String, Arc<AudioBuffer>>,
    evicted: Vec<String>,
}

impl ProcessedBufferCache {
    /// Create a cache holding at most `capacity` buffers.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
            evicted: Vec::new(),
        }
    }

    /// Key for `source` processed with `params`.
    pub fn key_for(source: &AudioBuffer, params: &ProcessingParams) -> String {
        params.cache_key(&fingerprint(source))
    }

    /// Cached result for a raw key.
    pub fn get_key(&mut self, key: &str) -> Option<Arc<AudioBuffer>> {
        self.cache.get(key).cloned()
    }

    /// Store a result under a raw key.
    pub fn insert_key(&mut self, key: String, processed: Arc<AudioBuffer>) {
        if let Some((old, _)) = self.cache.insert(key, processed) {
            self.note_eviction(old);
        }
    }

    /// Cached result of processing `source` with `params`.
    pub fn get(
        &mut self,
        source: &AudioBuffer,
        params: &ProcessingParams,
    ) -> Option<Arc<AudioBuffer>> {
        self.get_key(&Self::key_for(source, params))
    }

    /// Store the result of processing `source` with `params`.
    pub fn insert(
        &mut self,
        source: &AudioBuffer,
        params: &ProcessingParams,
        processed: AudioBuffer,
    ) -> Arc<AudioBuffer> {
        let processed = Arc::new(processed);
        self.insert_key(Self::key_for(source, params), Arc::clone(&processed));
        processed
    }

    /// Return the cached result or run `process` and cache its output.
    ///
    /// Errors from `process` are passed through and nothing is cached.
    pub fn get_or_process<F, E>(
        &mut self,
        source: &AudioBuffer,
        params: &ProcessingParams,
        process: F,
    ) -> Result<Arc<AudioBuffer>, E>
    where
        F: FnOnce(&AudioBuffer, &ProcessingParams) -> Result<AudioBuffer, E>,
    {
        let key = Self::key_for(source, params);
        let (value, evicted) = self
            .cache
            .try_get_or_insert_with(key, || process(source, params).map(Arc::new))?;
        if let Some((old, _)) = evicted {
            self.note_eviction(old);
        }
        Ok(value)
    }

    fn note_eviction(&mut self, key: String) {
        #[cfg(feature = "tracing")]
        tracing::trace!(key = %key, "processed buffer evicted");
        self.evicted.push(key);
    }

    /// Keys evicted since the last call.
    pub fn drain_evictions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.evicted)
    }

    /// Number of cached buffers.
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

    /// Drop every cached buffer.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for ProcessedBufferCache {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSED_CAPACITY)
    }
}
