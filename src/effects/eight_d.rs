//! Pseudo-8D panning effect
//!
//! The signature effect: slow auto-pan via ffmpeg's `apulsator`, which
//! sweeps the signal between the left and right channels. Always applied,
//! regardless of the user's other selections.

use serde::{Deserialize, Serialize};

use super::effect::{ensure_finite, Effect};
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::ffmpeg::Ffmpeg;

/// Default spin speed in Hz (one full left-right cycle every 5 seconds)
pub const DEFAULT_SPIN_HZ: f32 = 0.2;

/// Pseudo-8D rotation effect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EightD {
    /// Rotation speed in Hz (0.01-10)
    spin_hz: f32,
}

impl Default for EightD {
    fn default() -> Self {
        Self {
            spin_hz: DEFAULT_SPIN_HZ,
        }
    }
}

impl EightD {
    /// Create the effect with a specific spin speed (clamped to 0.01-10 Hz)
    pub fn new(spin_hz: f32) -> Self {
        Self {
            spin_hz: spin_hz.clamp(0.01, 10.0),
        }
    }

    /// Get the spin speed in Hz
    pub fn spin_hz(&self) -> f32 {
        self.spin_hz
    }

    /// Build the ffmpeg filter graph string
    pub fn filter_string(&self) -> String {
        format!("apulsator=hz={}", self.spin_hz)
    }
}

impl Effect for EightD {
    fn name(&self) -> &'static str {
        "8d"
    }

    fn display_name(&self) -> &'static str {
        "8D Rotation"
    }

    fn apply(&self, ffmpeg: &Ffmpeg, buffer: AudioBuffer) -> Result<AudioBuffer> {
        let filtered = ffmpeg.run_filter(&buffer, &self.filter_string())?;
        ensure_finite(self.name(), filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_string() {
        let effect = EightD::default();
        assert_eq!(effect.filter_string(), "apulsator=hz=0.2");
    }

    #[test]
    fn test_custom_spin_speed() {
        let effect = EightD::new(0.5);
        assert_eq!(effect.filter_string(), "apulsator=hz=0.5");
    }

    #[test]
    fn test_spin_speed_clamped() {
        assert_eq!(EightD::new(0.0).spin_hz(), 0.01);
        assert_eq!(EightD::new(100.0).spin_hz(), 10.0);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let effect = EightD::new(0.35);
        let json = serde_json::to_value(&effect).unwrap();
        let restored: EightD = serde_json::from_value(json).unwrap();
        assert_eq!(restored, effect);
    }
}
