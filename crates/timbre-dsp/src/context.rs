//! Explicit owner of the state shared by analysis calls.
//!
//! A [`DspContext`] is created by the host and handed to whatever needs a
//! window or a cache. Nothing in the crate keeps global state, so "one
//! instance per execution context" is a matter of ownership.

use std::sync::Arc;

use crate::buffer::AudioBuffer;
use crate::cache::{CacheCapacity, LoudnessCache, ProcessedBufferCache, ProcessingParams};
use crate::error::Result;
use crate::formant::{FormantAnalysis, FormantOptions, FormantTracker};
use crate::join::{
    JoinGainCorrection, JoinOptions, correction_from_analyses, head_range, tail_range,
};
use crate::loudness::{LoudnessAnalysis, LoudnessRange};
use crate::spectrogram::{Spectrogram, SpectrogramOptions, compute_spectrogram};
use crate::window::WindowCache;

/// Cache key evicted from one of the context's caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eviction {
    /// A processed buffer was dropped.
    ProcessedBuffer(String),
    /// A loudness measurement was dropped.
    Loudness(String),
}

/// Windows and caches for one execution context.
#[derive(Debug)]
pub struct DspContext {
    windows: WindowCache,
    processed: ProcessedBufferCache,
    loudness: LoudnessCache,
}

impl DspContext {
    /// Create a context with the given cache capacities.
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            windows: WindowCache::new(),
            processed: ProcessedBufferCache::new(capacity.processed_buffers),
            loudness: LoudnessCache::new(capacity.loudness),
        }
    }

    /// Window cache.
    pub fn windows(&mut self) -> &mut WindowCache {
        &mut self.windows
    }

    /// Processed buffer cache.
    pub fn processed(&mut self) -> &mut ProcessedBufferCache {
        &mut self.processed
    }

    /// Loudness cache.
    pub fn loudness(&mut self) -> &mut LoudnessCache {
        &mut self.loudness
    }

    /// Track formants over `samples`.
    pub fn analyze_formants(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
        options: &FormantOptions,
    ) -> Result<FormantAnalysis> {
        FormantTracker::new(sample_rate, options.clone())?.analyze(samples, &mut self.windows)
    }

    /// Spectrogram of `samples`.
    pub fn spectrogram(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
        options: &SpectrogramOptions,
    ) -> Result<Spectrogram> {
        compute_spectrogram(samples, sample_rate, options, &mut self.windows)
    }

    /// Cached loudness of `range` within `buffer`.
    pub fn analyze_loudness(
        &mut self,
        buffer: &AudioBuffer,
        range: &LoudnessRange,
    ) -> LoudnessAnalysis {
        self.loudness.analyze(buffer, range)
    }

    /// Join correction using cached loudness for both regions.
    pub fn join_correction(
        &mut self,
        a: &AudioBuffer,
        b: &AudioBuffer,
        options: &JoinOptions,
    ) -> JoinGainCorrection {
        let tail = self.loudness.analyze(a, &tail_range(a, options));
        let head = self.loudness.analyze(b, &head_range(b, options));
        correction_from_analyses(&tail, &head, options)
    }

    /// Cached pitch/time processing of `source`.
    pub fn process_cached<F, E>(
        &mut self,
        source: &AudioBuffer,
        params: &ProcessingParams,
        process: F,
    ) -> std::result::Result<Arc<AudioBuffer>, E>
    where
        F: FnOnce(&AudioBuffer, &ProcessingParams) -> std::result::Result<AudioBuffer, E>,
    {
        self.processed.get_or_process(source, params, process)
    }

    /// Evictions from both caches since the last call.
    pub fn drain_evictions(&mut self) -> Vec<Eviction> {
        self.processed
            .drain_evictions()
            .into_iter()
            .map(Eviction::ProcessedBuffer)
            .chain(self.loudness.drain_evictions().into_iter().map(Eviction::Loudness))
            .collect()
    }

    /// Empty both result caches. Windows are kept.
    pub fn clear_caches(&mut self) {
        self.processed.clear();
        self.loudness.clear();
    }
}

impl Default for DspContext {
    fn default() -> Self {
        Self::new(CacheCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_shared_between_analyses() {
        let mut ctx = DspContext::default();
        let samples = vec![0.0; 4096];
        ctx.spectrogram(&samples, 16000, &SpectrogramOptions::default()).unwrap();
        ctx.analyze_formants(&samples, 16000, &FormantOptions::default()).unwrap();
        assert_eq!(ctx.windows().len(), 1);
    }

    #[test]
    fn join_uses_loudness_cache() {
        let mut ctx = DspContext::default();
        let a = AudioBuffer::mono(vec![0.2; 48000], 48000);
        let b = AudioBuffer::mono(vec![0.1; 48000], 48000);
        ctx.join_correction(&a, &b, &JoinOptions::default());
        ctx.join_correction(&a, &b, &JoinOptions::default());
        assert_eq!(ctx.loudness().stats(), (2, 2));
    }

    #[test]
    fn evictions_collected_from_both_caches() {
        let mut ctx = DspContext::new(CacheCapacity {
            processed_buffers: 1,
            loudness: 1,
        });
        let a = AudioBuffer::mono(vec![0.2; 100], 48000);
        let b = AudioBuffer::mono(vec![0.3; 100], 48000);
        ctx.analyze_loudness(&a, &LoudnessRange::full());
        ctx.analyze_loudness(&b, &LoudnessRange::full());
        let params = ProcessingParams::default();
        ctx.process_cached(&a, &params, |s, _| Ok::<_, ()>(s.clone())).unwrap();
        ctx.process_cached(&b, &params, |s, _| Ok::<_, ()>(s.clone())).unwrap();

        let evictions = ctx.drain_evictions();
        assert_eq!(evictions.len(), 2);
        assert!(matches!(evictions[0], Eviction::ProcessedBuffer(_)));
        assert!(matches!(evictions[1], Eviction::Loudness(_)));
        assert!(ctx.drain_evictions().is_empty());
    }

    #[test]
    fn clear_keeps_windows() {
        let mut ctx = DspContext::default();
        let a = AudioBuffer::mono(vec![0.2; 4096], 16000);
        ctx.analyze_loudness(&a, &LoudnessRange::full());
        ctx.spectrogram(a.channel(0), 16000, &SpectrogramOptions::default()).unwrap();
        ctx.clear_caches();
        assert!(ctx.loudness().is_empty());
        assert_eq!(ctx.windows().len(), 1);
    }
}
