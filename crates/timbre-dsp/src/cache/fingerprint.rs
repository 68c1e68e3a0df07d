//! Cheap content fingerprints for sample buffers.
//!
//! Not cryptographic and not collision resistant against crafted input.
//! Recorded audio almost never shares length, rate and opening samples, which
//! is all this needs to tell apart.

use crate::buffer::AudioBuffer;

/// Leading samples folded into the hash.
pub const FINGERPRINT_SAMPLES: usize = 128;

/// Quantization step for hashed samples.
const QUANTIZE: f64 = 1e6;

#[inline]
fn mix(hash: u64, value: u64) -> u64 {
    hash.wrapping_mul(31).wrapping_add(value)
}

/// Fingerprint of `buffer`.
///
/// Rolling hash over sample count, sample rate, channel count and the first
/// [`FINGERPRINT_SAMPLES`] samples of channel 0 rounded to 1e-6.
pub fn fingerprint(buffer: &AudioBuffer) -> String {
    let len = buffer.len();
    let mut hash = mix(0, len as u64);
    hash = mix(hash, u64::from(buffer.sample_rate()));
    hash = mix(hash, buffer.num_channels() as u64);
    for &s in buffer.channel(0).iter().take(FINGERPRINT_SAMPLES) {
        let q = (f64::from(s) * QUANTIZE).round() as i64;
        hash = mix(hash, q as u64);
    }
    format!("{len}-{}-{hash:016x}", buffer.sample_rate())
}
