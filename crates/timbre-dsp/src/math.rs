//! Level conversions and small numeric helpers.
//!
//! All levels are relative to full scale (amplitude 1.0).

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use timbre_dsp::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels.
///
/// Zero and negative inputs map to negative infinity rather than being
/// floored, so silence stays distinguishable from very quiet signal.
///
/// # Example
/// ```rust
/// use timbre_dsp::linear_to_db;
///
/// assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
/// assert_eq!(linear_to_db(0.0), f32::NEG_INFINITY);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// Multiply every sample by `gain` in place.
#[inline]
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// Root-mean-square of a slice, accumulated in `f64`.
///
/// Returns 0.0 for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_roundtrip() {
        for db in [-60.0, -18.0, -1.0, 0.0, 6.0, 12.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} -> {back}");
        }
    }

    #[test]
    fn linear_to_db_of_negative_is_neg_infinity() {
        assert_eq!(linear_to_db(-0.5), f32::NEG_INFINITY);
    }

    #[test]
    fn apply_gain_scales() {
        let mut buf = vec![0.5, -0.25, 1.0];
        apply_gain(&mut buf, 2.0);
        assert_eq!(buf, vec![1.0, -0.5, 2.0]);
    }

    #[test]
    fn rms_of_constant() {
        assert!((rms(&[0.5; 64]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }
}
