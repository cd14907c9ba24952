//! Bass boost effect
//!
//! A single fixed equalizer band at 90 Hz via ffmpeg's `equalizer` filter.
//! Only the gain is adjustable; center frequency and width are part of the
//! preset.

use serde::{Deserialize, Serialize};

use super::effect::{ensure_finite, Effect};
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::ffmpeg::Ffmpeg;

/// Center frequency of the boost band in Hz
pub const BASS_FREQ_HZ: u32 = 90;

/// Default boost gain in dB
pub const DEFAULT_GAIN_DB: f32 = 15.0;

/// Low-frequency boost effect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BassBoost {
    /// Boost gain in dB (0-24)
    gain_db: f32,
}

impl Default for BassBoost {
    fn default() -> Self {
        Self {
            gain_db: DEFAULT_GAIN_DB,
        }
    }
}

impl BassBoost {
    /// Create the effect with a specific gain (clamped to 0-24 dB)
    pub fn new(gain_db: f32) -> Self {
        Self {
            gain_db: gain_db.clamp(0.0, 24.0),
        }
    }

    /// Get the boost gain in dB
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Build the ffmpeg filter graph string
    pub fn filter_string(&self) -> String {
        format!("equalizer=f={}:t=q:w=2:g={}", BASS_FREQ_HZ, self.gain_db)
    }
}

impl Effect for BassBoost {
    fn name(&self) -> &'static str {
        "bass_boost"
    }

    fn display_name(&self) -> &'static str {
        "Bass Boost"
    }

    fn apply(&self, ffmpeg: &Ffmpeg, buffer: AudioBuffer) -> Result<AudioBuffer> {
        let filtered = ffmpeg.run_filter(&buffer, &self.filter_string())?;
        ensure_finite(self.name(), filtered)
    }
}
