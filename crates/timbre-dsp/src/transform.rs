//! Radix-2 complex FFT.
//!
//! [`fft_in_place`] is the single transform implementation. The interleaved
//! (`[re, im, re, im, ..]`) and split (separate real/imaginary slices)
//! calling conventions are thin adapters over it, so both conventions give
//! bit-identical results.
//!
//! The inverse transform is scaled by `1/n`, making `inverse(forward(x)) == x`
//! up to rounding.

use std::f64::consts::PI;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Single-precision complex sample.
pub type Complex32 = Complex<f32>;

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Time domain to frequency domain.
    Forward,
    /// Frequency domain to time domain, normalized by `1/n`.
    Inverse,
}

fn check_len(len: usize) -> Result<()> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(Error::NonPowerOfTwo { len })
    }
}

/// Reorder `buffer` into bit-reversed index order.
fn bit_reverse_permute(buffer: &mut [Complex32]) {
    let n = buffer.len();
    let mut j = 0;
    for i in 0..n {
        if i < j {
            buffer.swap(i, j);
        }
        let mut m = n >> 1;
        while m >= 1 && j >= m {
            j -= m;
            m >>= 1;
        }
        j += m;
    }
}

/// In-place iterative Cooley-Tukey FFT over a power-of-two buffer.
///
/// Twiddle factors are evaluated in `f64` and rounded once.
///
/// # Errors
/// [`Error::NonPowerOfTwo`] if `buffer.len()` is not a power of two
/// (zero included). The buffer is left untouched in that case.
///
/// # Example
/// ```rust
/// use timbre_dsp::transform::{fft_in_place, Complex32, Direction};
///
/// let mut buf = vec![Complex32::new(0.0, 0.0); 8];
/// buf[0] = Complex32::new(1.0, 0.0);
/// fft_in_place(&mut buf, Direction::Forward).unwrap();
/// assert!(buf.iter().all(|c| (c.norm() - 1.0).abs() < 1e-6));
/// ```
pub fn fft_in_place(buffer: &mut [Complex32], direction: Direction) -> Result<()> {
    let n = buffer.len();
    check_len(n)?;
    if n == 1 {
        return Ok(());
    }

    bit_reverse_permute(buffer);

    let sign = match direction {
        Direction::Forward => -1.0,
        Direction::Inverse => 1.0,
    };
    let twiddles: Vec<Complex32> = (0..n / 2)
        .map(|k| {
            let angle = sign * 2.0 * PI * k as f64 / n as f64;
            Complex32::new(angle.cos() as f32, angle.sin() as f32)
        })
        .collect();

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let stride = n / len;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let w = twiddles[k * stride];
                let t = buffer[start + k + half] * w;
                let u = buffer[start + k];
                buffer[start + k] = u + t;
                buffer[start + k + half] = u - t;
            }
        }
        len <<= 1;
    }

    if direction == Direction::Inverse {
        let scale = 1.0 / n as f32;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
    Ok(())
}

/// Transform an interleaved `[re0, im0, re1, im1, ..]` buffer in place.
///
/// # Errors
/// [`Error::ShapeMismatch`] for an odd-length slice,
/// [`Error::NonPowerOfTwo`] if the number of complex pairs is not a power of two.
pub fn fft_interleaved(data: &mut [f32], direction: Direction) -> Result<()> {
    if data.len() % 2 != 0 {
        return Err(Error::ShapeMismatch {
            expected: data.len() + 1,
            actual: data.len(),
        });
    }
    check_len(data.len() / 2)?;

    let mut buffer: Vec<Complex32> = data
        .chunks_exact(2)
        .map(|pair| Complex32::new(pair[0], pair[1]))
        .collect();
    fft_in_place(&mut buffer, direction)?;
    for (pair, c) in data.chunks_exact_mut(2).zip(&buffer) {
        pair[0] = c.re;
        pair[1] = c.im;
    }
    Ok(())
}

/// Transform parallel real and imaginary slices in place.
///
/// # Errors
/// [`Error::ShapeMismatch`] if the slices differ in length,
/// [`Error::NonPowerOfTwo`] if their length is not a power of two.
pub fn fft_split(real: &mut [f32], imag: &mut [f32], direction: Direction) -> Result<()> {
    if real.len() != imag.len() {
        return Err(Error::ShapeMismatch {
            expected: real.len(),
            actual: imag.len(),
        });
    }
    check_len(real.len())?;

    let mut buffer: Vec<Complex32> = real
        .iter()
        .zip(imag.iter())
        .map(|(&re, &im)| Complex32::new(re, im))
        .collect();
    fft_in_place(&mut buffer, direction)?;
    for ((re, im), c) in real.iter_mut().zip(imag.iter_mut()).zip(&buffer) {
        *re = c.re;
        *im = c.im;
    }
    Ok(())
}
