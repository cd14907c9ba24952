//! Audio Buffer Management
//!
//! Provides the core audio buffer type shared by the effect pipeline.
//! Samples are stored as non-interleaved 32-bit floats; the sample rate of
//! the source file is preserved end to end.

use crate::error::{EchoSphereError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Calculate the RMS (Root Mean Square) level of an audio buffer in dB
///
/// Returns -f32::INFINITY for empty or silent buffers.
pub fn calculate_rms(buffer: &AudioBuffer) -> f32 {
    let total_samples = buffer.num_channels() * buffer.num_samples();
    if total_samples == 0 {
        return f32::NEG_INFINITY;
    }

    let sum_squares: f64 = buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .map(|&s| (s as f64) * (s as f64))
        .sum();

    let rms = (sum_squares / total_samples as f64).sqrt() as f32;
    linear_to_db(rms)
}

/// Calculate the peak level of an audio buffer in dB
///
/// Returns -f32::INFINITY for empty buffers.
pub fn calculate_peak(buffer: &AudioBuffer) -> f32 {
    let peak = buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .map(|&s| s.abs())
        .fold(0.0_f32, f32::max);

    linear_to_db(peak)
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for all processing in EchoSphere
///
/// Stores audio as non-interleaved 32-bit floating point samples.
/// Each channel is a separate Vec<f32>.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new silent buffer with the specified length and layout
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        let num_channels = layout.num_channels();
        let samples = vec![vec![0.0_f32; num_samples]; num_channels];
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Errors
    /// Returns `InvalidAudio` if the data length is not divisible by the
    /// channel count.
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.is_empty() {
            return Ok(Self {
                samples: vec![Vec::new(); num_channels],
                sample_rate,
            });
        }

        if interleaved.len() % num_channels != 0 {
            return Err(EchoSphereError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved format (L, R, L, R, ... for stereo)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_channels = self.num_channels();
        let num_samples = self.num_samples();

        if num_channels == 0 || num_samples == 0 {
            return Vec::new();
        }

        let mut interleaved = Vec::with_capacity(num_channels * num_samples);

        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }

    /// Get the channel layout, if mono or stereo
    pub fn channel_layout(&self) -> Option<ChannelLayout> {
        ChannelLayout::from_count(self.num_channels())
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Get mutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Convert to stereo
    ///
    /// Mono audio is duplicated into both channels; stereo passes through
    /// unchanged. The pipeline applies this before any effect so the
    /// spatial effects always see two channels.
    ///
    /// # Errors
    /// Returns `UnsupportedFormat` for more than two channels.
    pub fn to_stereo(self) -> Result<Self> {
        match self.num_channels() {
            1 => {
                let mono = self.samples.into_iter().next().unwrap_or_default();
                Ok(Self {
                    samples: vec![mono.clone(), mono],
                    sample_rate: self.sample_rate,
                })
            }
            2 => Ok(self),
            n => Err(EchoSphereError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", n),
            }),
        }
    }

    /// Check if all samples are finite (not NaN or Infinity)
    ///
    /// Used to catch broken output coming back from the external filter.
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }

    /// Truncate every channel to `num_samples`
    pub fn truncate(&mut self, num_samples: usize) {
        for channel in &mut self.samples {
            channel.truncate(num_samples);
        }
    }
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::new(0, ChannelLayout::Stereo, 44100)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn create_test_buffer(samples: Vec<Vec<f32>>) -> AudioBuffer {
        AudioBuffer {
            samples,
            sample_rate: 44100,
        }
    }

    #[test]
    fn test_db_to_linear() {
        assert_abs_diff_eq!(db_to_linear(0.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(db_to_linear(-6.0206), 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(db_to_linear(-20.0), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_to_db() {
        assert_abs_diff_eq!(linear_to_db(1.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(linear_to_db(0.5), -6.0206, epsilon = 1e-3);
        assert!(linear_to_db(0.0).is_infinite() && linear_to_db(0.0).is_sign_negative());
    }

    #[test]
    fn test_calculate_rms_unity() {
        let buffer = create_test_buffer(vec![vec![1.0; 1000]]);
        let rms = calculate_rms(&buffer);
        assert_abs_diff_eq!(rms, 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_calculate_rms_empty() {
        let buffer = create_test_buffer(vec![]);
        let rms = calculate_rms(&buffer);
        assert!(rms.is_infinite() && rms.is_sign_negative());
    }

    #[test]
    fn test_calculate_peak() {
        let mut samples = vec![0.0; 1000];
        samples[500] = -0.5;
        let buffer = create_test_buffer(vec![samples]);
        let peak = calculate_peak(&buffer);
        assert_abs_diff_eq!(peak, -6.02, epsilon = 0.1);
    }

    #[test]
    fn test_channel_layout() {
        assert_eq!(ChannelLayout::Mono.num_channels(), 1);
        assert_eq!(ChannelLayout::Stereo.num_channels(), 2);
        assert_eq!(ChannelLayout::from_count(1), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::from_count(2), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::from_count(6), None);
    }

    #[test]
    fn test_buffer_new() {
        let buffer = AudioBuffer::new(1000, ChannelLayout::Stereo, 48000);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_samples(), 1000);
        assert_eq!(buffer.sample_rate, 48000);
    }

    #[test]
    fn test_buffer_duration() {
        let buffer = AudioBuffer::new(44100, ChannelLayout::Mono, 44100);
        assert_abs_diff_eq!(buffer.duration_secs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_buffer_from_interleaved_stereo() {
        let interleaved = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let buffer =
            AudioBuffer::from_interleaved(&interleaved, ChannelLayout::Stereo, 44100).unwrap();

        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_samples(), 3);
        assert_eq!(buffer.channel(0), &[0.1, 0.3, 0.5]);
        assert_eq!(buffer.channel(1), &[0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_buffer_from_interleaved_invalid() {
        // 5 samples can't be evenly split into stereo
        let interleaved = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        let result = AudioBuffer::from_interleaved(&interleaved, ChannelLayout::Stereo, 44100);
        assert!(result.is_err());
    }

    #[test]
    fn test_buffer_interleaved_roundtrip() {
        let original = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let buffer =
            AudioBuffer::from_interleaved(&original, ChannelLayout::Stereo, 44100).unwrap();
        let roundtrip = buffer.to_interleaved();
        assert_eq!(original, roundtrip);
    }

    #[test]
    fn test_to_stereo_from_mono() {
        let buffer = create_test_buffer(vec![vec![0.1, 0.2, 0.3]]);
        let stereo = buffer.to_stereo().unwrap();

        assert_eq!(stereo.num_channels(), 2);
        assert_eq!(stereo.channel(0), stereo.channel(1));
        assert_eq!(stereo.channel(0), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_to_stereo_passthrough() {
        let buffer = create_test_buffer(vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        let stereo = buffer.clone().to_stereo().unwrap();
        assert_eq!(stereo, buffer);
    }

    #[test]
    fn test_to_stereo_rejects_multichannel() {
        let buffer = create_test_buffer(vec![vec![0.0; 10]; 6]);
        let result = buffer.to_stereo();
        assert!(matches!(
            result,
            Err(EchoSphereError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_buffer_is_finite() {
        let buffer = create_test_buffer(vec![vec![0.5; 100]]);
        assert!(buffer.is_finite());

        let buffer_nan = create_test_buffer(vec![vec![f32::NAN; 100]]);
        assert!(!buffer_nan.is_finite());
    }

    #[test]
    fn test_buffer_truncate() {
        let mut buffer = create_test_buffer(vec![vec![0.1; 100], vec![0.2; 100]]);
        buffer.truncate(40);
        assert_eq!(buffer.num_samples(), 40);
        assert_eq!(buffer.channel(1).len(), 40);
    }
}
