//! Hann window generation with a per-length cache.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

/// Symmetric Hann window: `w[i] = 0.5 * (1 - cos(2πi / (len - 1)))`.
///
/// Both end points are zero and the peak is 1.0. A length-1 window is `[1.0]`
/// because the formula is undefined there.
pub fn hann(len: usize) -> Vec<f32> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos())) as f32)
                .collect()
        }
    }
}

/// Cache of Hann windows keyed by length.
///
/// Growth is unbounded: callers use a handful of fixed FFT sizes, so the
/// map holds only a few entries in practice.
#[derive(Debug, Default)]
pub struct WindowCache {
    windows: HashMap<usize, Arc<[f32]>>,
}

impl WindowCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hann window of `len` samples, generated on first use.
    pub fn hann(&mut self, len: usize) -> Arc<[f32]> {
        Arc::clone(
            self.windows
                .entry(len)
                .or_insert_with(|| Arc::from(hann(len))),
        )
    }

    /// Number of cached lengths.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when nothing has been generated yet.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Multiply `frame` by `window` sample-by-sample into `out`.
///
/// Extra samples on either side are ignored; `out` is resized to the shorter
/// of the two inputs.
pub fn apply_window(frame: &[f32], window: &[f32], out: &mut Vec<f32>) {
    out.clear();
    out.extend(frame.iter().zip(window).map(|(&s, &w)| s * w));
}
