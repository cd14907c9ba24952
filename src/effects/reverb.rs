//! Reverb effect
//!
//! A short single-tap echo via ffmpeg's `aecho` filter. The preset values
//! (0.6:0.5:40:0.25) give a small-room ambience rather than a hall reverb.

use serde::{Deserialize, Serialize};

use super::effect::{ensure_finite, Effect};
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::ffmpeg::Ffmpeg;

/// Reverb effect built on `aecho`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reverb {
    /// Input gain of the reflected signal (0-1)
    in_gain: f32,
    /// Output gain of the reflected signal (0-1)
    out_gain: f32,
    /// Reflection delay in milliseconds (1-1000)
    delay_ms: f32,
    /// Reflection decay (0-1)
    decay: f32,
}

impl Default for Reverb {
    fn default() -> Self {
        Self {
            in_gain: 0.6,
            out_gain: 0.5,
            delay_ms: 40.0,
            decay: 0.25,
        }
    }
}

impl Reverb {
    /// Create a reverb with explicit echo parameters (clamped to aecho ranges)
    pub fn new(in_gain: f32, out_gain: f32, delay_ms: f32, decay: f32) -> Self {
        Self {
            in_gain: in_gain.clamp(0.0, 1.0),
            out_gain: out_gain.clamp(0.0, 1.0),
            delay_ms: delay_ms.clamp(1.0, 1000.0),
            decay: decay.clamp(0.0, 1.0),
        }
    }

    /// Get the reflection delay in milliseconds
    pub fn delay_ms(&self) -> f32 {
        self.delay_ms
    }

    /// Get the reflection decay
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Build the ffmpeg filter graph string
    pub fn filter_string(&self) -> String {
        format!(
            "aecho={}:{}:{}:{}",
            self.in_gain, self.out_gain, self.delay_ms, self.decay
        )
    }
}

impl Effect for Reverb {
    fn name(&self) -> &'static str {
        "reverb"
    }

    fn display_name(&self) -> &'static str {
        "Reverb"
    }

    fn apply(&self, ffmpeg: &Ffmpeg, buffer: AudioBuffer) -> Result<AudioBuffer> {
        let filtered = ffmpeg.run_filter(&buffer, &self.filter_string())?;
        ensure_finite(self.name(), filtered)
    }
}
