//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use crate::effects::{BassBoost, Brainwave, EightD};
use crate::error::Result;
use crate::ffmpeg::Ffmpeg;
use crate::pipeline::{self, EffectSelection, Settings};

/// Options for the `process` command
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub selection: EffectSelection,
    pub spin_hz: f32,
    pub bass_gain_db: f32,
    pub brainwave_delay_ms: f32,
    pub bitrate: String,
}

impl ProcessOptions {
    fn settings(&self) -> Settings {
        Settings {
            eight_d: EightD::new(self.spin_hz),
            bass_boost: BassBoost::new(self.bass_gain_db),
            brainwave: Brainwave::new(self.brainwave_delay_ms),
            bitrate: self.bitrate.clone(),
            ..Settings::default()
        }
    }
}

/// Process an input file and export the result as MP3.
pub fn process(
    ffmpeg: &Ffmpeg,
    input: &Path,
    output: Option<&Path>,
    options: &ProcessOptions,
) -> Result<()> {
    ffmpeg.check()?;

    let settings = options.settings();
    let written = pipeline::run(
        ffmpeg,
        input,
        output,
        options.selection,
        &settings,
        &mut |stage| println!("{}", stage),
    )?;

    println!("Exported to: {}", written.display());
    Ok(())
}

/// Show metadata for an audio file.
pub fn inspect(ffmpeg: &Ffmpeg, input: &Path) -> Result<()> {
    info!("Probing: {}", input.display());

    let meta = ffmpeg.probe(input)?;

    println!("File:        {}", input.display());
    println!("Format:      {}", meta.format);
    println!(
        "Duration:    {:.1}s",
        meta.duration_ms as f64 / 1000.0
    );
    if let Some(bitrate) = meta.bitrate {
        println!("Bit rate:    {} kb/s", bitrate / 1000);
    }
    if let Some(rate) = meta.sample_rate {
        println!("Sample rate: {} Hz", rate);
    }
    if let Some(channels) = meta.channels {
        println!("Channels:    {}", channels);
    }

    Ok(())
}

/// Verify the ffmpeg binary can be spawned.
pub fn check(ffmpeg: &Ffmpeg) -> Result<()> {
    ffmpeg.check()?;
    println!("ffmpeg OK: {}", ffmpeg.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_build_settings() {
        let options = ProcessOptions {
            selection: EffectSelection::all(),
            spin_hz: 0.4,
            bass_gain_db: 10.0,
            brainwave_delay_ms: 20.0,
            bitrate: "192k".to_string(),
        };

        let settings = options.settings();
        assert_eq!(settings.eight_d, EightD::new(0.4));
        assert_eq!(settings.bass_boost, BassBoost::new(10.0));
        assert_eq!(settings.brainwave, Brainwave::new(20.0));
        assert_eq!(settings.bitrate, "192k");
    }
}
