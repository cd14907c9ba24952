//! Processing pipeline
//!
//! Sequences a full conversion run: decode → force stereo → 8D pan →
//! optional effects → MP3 export. The order is fixed; the 8D rotation is
//! always applied, the other three effects are opt-in (the original form's
//! checkboxes).

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::effects::{BassBoost, Brainwave, Effect, EightD, Reverb};
use crate::engine::buffer::calculate_peak;
use crate::engine::{decode, default_export_name, export_mp3, DEFAULT_MP3_BITRATE};
use crate::error::Result;
use crate::ffmpeg::Ffmpeg;

/// The user's opt-in effect choices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSelection {
    pub bass_boost: bool,
    pub reverb: bool,
    pub brainwave: bool,
}

impl EffectSelection {
    /// Select every optional effect
    pub fn all() -> Self {
        Self {
            bass_boost: true,
            reverb: true,
            brainwave: true,
        }
    }
}

/// Tunable parameters for a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub eight_d: EightD,
    pub bass_boost: BassBoost,
    pub reverb: Reverb,
    pub brainwave: Brainwave,
    /// MP3 export bitrate in ffmpeg notation
    pub bitrate: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            eight_d: EightD::default(),
            bass_boost: BassBoost::default(),
            reverb: Reverb::default(),
            brainwave: Brainwave::default(),
            bitrate: DEFAULT_MP3_BITRATE.to_string(),
        }
    }
}

/// Progress stages reported during a run
///
/// These carry the text the original form showed in its status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decoding,
    ApplyingEffect(&'static str),
    Exporting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Decoding => write!(f, "Loading audio..."),
            Stage::ApplyingEffect(name) => write!(f, "Applying {}...", name),
            Stage::Exporting => write!(f, "Exporting MP3..."),
            Stage::Done => write!(f, "Done"),
        }
    }
}

/// Build the effect chain for a selection, in fixed order
///
/// 8D always comes first; bass boost, reverb, and brainwave follow in that
/// order when selected.
pub fn build_chain(selection: EffectSelection, settings: &Settings) -> Vec<Box<dyn Effect>> {
    let mut chain: Vec<Box<dyn Effect>> = vec![Box::new(settings.eight_d.clone())];

    if selection.bass_boost {
        chain.push(Box::new(settings.bass_boost.clone()));
    }
    if selection.reverb {
        chain.push(Box::new(settings.reverb.clone()));
    }
    if selection.brainwave {
        chain.push(Box::new(settings.brainwave.clone()));
    }

    chain
}

/// Run a full conversion
///
/// Decodes `input`, applies the selected effects, and writes an MP3 to
/// `output` (or `<stem>_enhanced.mp3` next to the input when `None`).
/// Returns the path actually written. `progress` is invoked at each stage;
/// pass a closure that updates whatever status surface the caller has.
pub fn run(
    ffmpeg: &Ffmpeg,
    input: &Path,
    output: Option<&Path>,
    selection: EffectSelection,
    settings: &Settings,
    progress: &mut dyn FnMut(Stage),
) -> Result<PathBuf> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_export_name(input));

    info!(
        "Processing {} -> {} (bass={}, reverb={}, brainwave={})",
        input.display(),
        output.display(),
        selection.bass_boost,
        selection.reverb,
        selection.brainwave
    );

    progress(Stage::Decoding);
    let mut buffer = decode(ffmpeg, input)?.to_stereo()?;
    debug!(
        "Input: {:.1}s at {} Hz, peak {:.1} dBFS",
        buffer.duration_secs(),
        buffer.sample_rate,
        calculate_peak(&buffer)
    );

    for effect in build_chain(selection, settings) {
        progress(Stage::ApplyingEffect(effect.display_name()));
        buffer = effect.apply(ffmpeg, buffer)?;
        debug!(
            "After {}: {:.1}s, peak {:.1} dBFS",
            effect.name(),
            buffer.duration_secs(),
            calculate_peak(&buffer)
        );
    }

    progress(Stage::Exporting);
    export_mp3(ffmpeg, &buffer, &output, &settings.bitrate)?;

    progress(Stage::Done);
    info!("Exported to: {}", output.display());

    Ok(output)
}
