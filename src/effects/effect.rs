//! Effect trait definition
//!
//! Base trait for all effect presets. Effects consume a buffer and return
//! the processed one; ffmpeg-backed effects round-trip through the external
//! binary, so in-place processing buys nothing here.

use crate::engine::AudioBuffer;
use crate::error::{EchoSphereError, Result};
use crate::ffmpeg::Ffmpeg;

/// Base trait for all effect presets
pub trait Effect: Send + Sync {
    /// Stable name used in ordering, logs, and status lines
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Apply the effect, returning the processed buffer
    fn apply(&self, ffmpeg: &Ffmpeg, buffer: AudioBuffer) -> Result<AudioBuffer>;
}

/// Reject buffers the external filter corrupted (NaN/Inf samples)
pub(crate) fn ensure_finite(name: &str, buffer: AudioBuffer) -> Result<AudioBuffer> {
    if buffer.is_finite() {
        Ok(buffer)
    } else {
        Err(EchoSphereError::EffectOverflow {
            effect: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChannelLayout;

    #[test]
    fn test_ensure_finite_passes_clean_audio() {
        let buffer = AudioBuffer::new(100, ChannelLayout::Stereo, 44100);
        assert!(ensure_finite("8d", buffer).is_ok());
    }

    #[test]
    fn test_ensure_finite_rejects_nan() {
        let mut buffer = AudioBuffer::new(100, ChannelLayout::Stereo, 44100);
        buffer.channel_mut(0)[10] = f32::NAN;

        let err = ensure_finite("reverb", buffer).unwrap_err();
        match err {
            EchoSphereError::EffectOverflow { effect } => assert_eq!(effect, "reverb"),
            other => panic!("Expected EffectOverflow, got: {:?}", other),
        }
    }
}
