//! Effect Presets
//!
//! The fixed set of canned effects the converter offers. All except the
//! brainwave delay are thin wrappers around an ffmpeg filter-graph string;
//! their value is the preset, not any signal processing done here.

mod bass_boost;
mod brainwave;
mod effect;
mod eight_d;
mod reverb;

pub use bass_boost::BassBoost;
pub use brainwave::Brainwave;
pub use effect::Effect;
pub use eight_d::EightD;
pub use reverb::Reverb;

/// Order priority for effect names (lower = earlier in the pipeline)
///
/// The pseudo-8D pan always runs first; the brainwave delay runs last so
/// the channel offset it creates is not smeared by later filtering.
pub fn order_priority(name: &str) -> u32 {
    match name {
        "8d" => 0,
        "bass_boost" => 1,
        "reverb" => 2,
        "brainwave" => 3,
        _ => 2, // Default to middle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_priority() {
        assert!(order_priority("8d") < order_priority("bass_boost"));
        assert!(order_priority("bass_boost") < order_priority("reverb"));
        assert!(order_priority("reverb") < order_priority("brainwave"));
    }
}
