//! Binaural "brainwave" effect
//!
//! The one effect processed natively: the right channel is delayed by a few
//! milliseconds relative to the left, producing a subtle interaural time
//! difference. Both channels are truncated to the shorter length afterwards,
//! so total duration is unchanged.

use serde::{Deserialize, Serialize};

use super::effect::Effect;
use crate::engine::AudioBuffer;
use crate::error::{EchoSphereError, Result};
use crate::ffmpeg::Ffmpeg;

/// Default right-channel delay in milliseconds
pub const DEFAULT_DELAY_MS: f32 = 15.0;

/// Binaural channel-delay effect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brainwave {
    /// Right-channel delay in milliseconds (1-500)
    delay_ms: f32,
}

impl Default for Brainwave {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl Brainwave {
    /// Create the effect with a specific delay (clamped to 1-500 ms)
    pub fn new(delay_ms: f32) -> Self {
        Self {
            delay_ms: delay_ms.clamp(1.0, 500.0),
        }
    }

    /// Get the right-channel delay in milliseconds
    pub fn delay_ms(&self) -> f32 {
        self.delay_ms
    }

    /// Delay in samples at the given rate
    fn delay_samples(&self, sample_rate: u32) -> usize {
        ((self.delay_ms * sample_rate as f32 / 1000.0).round() as usize).max(1)
    }
}

impl Effect for Brainwave {
    fn name(&self) -> &'static str {
        "brainwave"
    }

    fn display_name(&self) -> &'static str {
        "Brainwave Effect"
    }

    fn apply(&self, _ffmpeg: &Ffmpeg, mut buffer: AudioBuffer) -> Result<AudioBuffer> {
        if buffer.num_channels() != 2 {
            return Err(EchoSphereError::StereoRequired {
                effect: self.name().to_string(),
            });
        }

        let delay = self.delay_samples(buffer.sample_rate);
        let left_len = buffer.channel(0).len();

        // Prepend silence to the right channel, then trim both channels to
        // the shorter length (the left channel's).
        let mut delayed = vec![0.0_f32; delay];
        delayed.extend_from_slice(buffer.channel(1));
        delayed.truncate(left_len);
        buffer.samples[1] = delayed;

        buffer.truncate(left_len);
        Ok(buffer)
    }
}
