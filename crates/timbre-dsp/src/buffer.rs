//! In-memory PCM buffers.

use crate::error::{Error, Result};

/// Decoded audio held as one `Vec<f32>` per channel.
///
/// Decoding is somebody else's job; this type only carries samples that
/// already exist in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap a single channel.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Build a buffer from several channels of equal length.
    ///
    /// An empty channel list is accepted and behaves as an empty mono buffer.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if let Some(first) = channels.first() {
            let expected = first.len();
            if let Some(bad) = channels.iter().find(|c| c.len() != expected) {
                return Err(Error::ShapeMismatch {
                    expected,
                    actual: bad.len(),
                });
            }
        }
        if sample_rate == 0 {
            return Err(Error::invalid("sample_rate", "must be non-zero"));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Samples of `index`, clamped to the last available channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        match self.channels.len() {
            0 => &[],
            n => self.channels[index.min(n - 1)].as_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_index_is_clamped() {
        let buf = AudioBuffer::from_channels(vec![vec![0.1; 4], vec![0.2; 4]], 48000).unwrap();
        assert_eq!(buf.channel(7)[0], 0.2);
        assert_eq!(buf.channel(0)[0], 0.1);
    }

    #[test]
    fn ragged_channels_rejected() {
        let err = AudioBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 3]], 48000).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn empty_channel_list_is_empty_buffer() {
        let buf = AudioBuffer::from_channels(Vec::new(), 44100).unwrap();
        assert!(buf.is_empty());
        assert!(buf.channel(0).is_empty());
        assert_eq!(buf.duration_seconds(), 0.0);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let buf = AudioBuffer::mono(vec![0.0; 22050], 44100);
        assert!((buf.duration_seconds() - 0.5).abs() < 1e-12);
    }
}
