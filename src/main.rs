//! EchoSphere CLI - 8D Audio Converter
//!
//! Command-line front end for the EchoSphere audio converter.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use echosphere::cli::{commands, Cli, Commands};
use echosphere::ffmpeg::Ffmpeg;
use echosphere::pipeline::EffectSelection;

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    info!("EchoSphere v{}", env!("CARGO_PKG_VERSION"));

    let ffmpeg = match cli.ffmpeg {
        Some(path) => Ffmpeg::new(path),
        None => Ffmpeg::from_env(),
    };

    match cli.command {
        Commands::Process {
            input,
            output,
            bass_boost,
            reverb,
            brainwave,
            spin_hz,
            bass_gain_db,
            brainwave_delay_ms,
            bitrate,
        } => {
            let options = commands::ProcessOptions {
                selection: EffectSelection {
                    bass_boost,
                    reverb,
                    brainwave,
                },
                spin_hz,
                bass_gain_db,
                brainwave_delay_ms,
                bitrate,
            };
            commands::process(&ffmpeg, &input, output.as_deref(), &options).map_err(|e| {
                for suggestion in e.recovery_suggestions() {
                    eprintln!("hint: {}", suggestion);
                }
                anyhow::anyhow!(e.friendly_message())
            })
        }
        Commands::Inspect { input } => {
            commands::inspect(&ffmpeg, &input).context("inspect failed")
        }
        Commands::Check => commands::check(&ffmpeg).map_err(|e| {
            for suggestion in e.recovery_suggestions() {
                eprintln!("hint: {}", suggestion);
            }
            anyhow::anyhow!(e.friendly_message())
        }),
    }
}
