//! Cepstral spectral envelope extraction.
//!
//! The log-magnitude spectrum of a voiced frame is the sum of a slowly
//! varying vocal-tract envelope and a fast harmonic ripple. Transforming the
//! log spectrum into the cepstral (quefrency) domain separates the two: the
//! envelope lives in the low-quefrency coefficients. A low-pass lifter keeps
//! those, and a forward transform brings the smoothed curve back.
//!
//! The lifter rolls off with a raised cosine rather than a hard cutoff, which
//! keeps Gibbs ringing out of the recovered envelope.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::transform::{Complex32, Direction, fft_in_place};

/// Added to every magnitude before the logarithm.
pub const LOG_EPSILON: f32 = 1e-10;

/// Widest raised-cosine taper, in quefrency bins.
pub const MAX_TAPER_WIDTH: usize = 4;

/// Smoothed log-magnitude spectrum, one value per bin from DC to Nyquist.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralEnvelope {
    values: Vec<f32>,
}

impl SpectralEnvelope {
    /// Wrap precomputed log-magnitude values.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Log-magnitude values indexed by bin.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of bins (`fft_size / 2 + 1`).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for an envelope with no bins.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the largest value.
    pub fn max_bin(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
    }

    /// Consume and return the raw values.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Lifter weight for every cepstral index of an `n`-point transform.
///
/// Quefrencies up to `lifter_order - taper` pass unchanged, the next
/// `taper` bins fall off along `0.5 * (1 + cos(πt))`, and everything above
/// `lifter_order` is zeroed. The same shape is mirrored at `n - q`.
pub fn lifter_weights(n: usize, lifter_order: usize) -> Vec<f32> {
    let taper = MAX_TAPER_WIDTH.min(lifter_order / 2);
    let full = lifter_order - taper;
    (0..n)
        .map(|i| {
            let q = i.min(n - i);
            if q <= full {
                1.0
            } else if q <= lifter_order {
                let t = (q - full) as f64 / taper as f64;
                (0.5 * (1.0 + (PI * t).cos())) as f32
            } else {
                0.0
            }
        })
        .collect()
}

/// Reusable cepstral envelope extractor for one FFT size and lifter order.
///
/// Holds the lifter weights and a scratch buffer so repeated frames do not
/// allocate beyond the returned envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeExtractor {
    fft_size: usize,
    lifter_order: usize,
    lifter: Vec<f32>,
    scratch: Vec<Complex32>,
}

impl EnvelopeExtractor {
    /// Create an extractor.
    ///
    /// # Errors
    /// [`Error::NonPowerOfTwo`] for a bad `fft_size`,
    /// [`Error::InvalidParameter`] when `lifter_order` is zero.
    pub fn new(fft_size: usize, lifter_order: usize) -> Result<Self> {
        if !fft_size.is_power_of_two() {
            return Err(Error::NonPowerOfTwo { len: fft_size });
        }
        if lifter_order == 0 {
            return Err(Error::invalid("lifter_order", "must be at least 1"));
        }
        Ok(Self {
            fft_size,
            lifter_order,
            lifter: lifter_weights(fft_size, lifter_order),
            scratch: vec![Complex32::new(0.0, 0.0); fft_size],
        })
    }

    /// FFT size this extractor was built for.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Quefrency cutoff.
    pub fn lifter_order(&self) -> usize {
        self.lifter_order
    }

    /// Extract the envelope of one already-windowed frame.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `frame.len()` differs from the FFT size.
    pub fn extract(&mut self, frame: &[f32]) -> Result<SpectralEnvelope> {
        if frame.len() != self.fft_size {
            return Err(Error::ShapeMismatch {
                expected: self.fft_size,
                actual: frame.len(),
            });
        }

        for (c, &s) in self.scratch.iter_mut().zip(frame) {
            *c = Complex32::new(s, 0.0);
        }
        fft_in_place(&mut self.scratch, Direction::Forward)?;

        for c in self.scratch.iter_mut() {
            *c = Complex32::new((c.norm() + LOG_EPSILON).ln(), 0.0);
        }

        // Real cepstrum
        fft_in_place(&mut self.scratch, Direction::Inverse)?;

        for (c, &w) in self.scratch.iter_mut().zip(&self.lifter) {
            *c *= w;
        }

        fft_in_place(&mut self.scratch, Direction::Forward)?;

        let values = self.scratch[..=self.fft_size / 2]
            .iter()
            .map(|c| c.re)
            .collect();
        Ok(SpectralEnvelope { values })
    }
}
