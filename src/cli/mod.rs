//! CLI Module
//!
//! Command-line interface for the EchoSphere audio converter.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EchoSphere - pseudo-8D audio converter
#[derive(Parser, Debug)]
#[command(name = "echosphere")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the ffmpeg binary (default: "ffmpeg" on PATH)
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the 8D effect (plus any selected extras) and export MP3
    #[command(name = "process")]
    Process {
        /// Input audio file (MP3, WAV, FLAC, OGG, ...)
        input: PathBuf,

        /// Output MP3 path (default: <input>_enhanced.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Add the bass boost effect
        #[arg(long)]
        bass_boost: bool,

        /// Add the reverb effect
        #[arg(long)]
        reverb: bool,

        /// Add the brainwave channel-delay effect
        #[arg(long)]
        brainwave: bool,

        /// 8D rotation speed in Hz
        #[arg(long, default_value_t = 0.2)]
        spin_hz: f32,

        /// Bass boost gain in dB
        #[arg(long, default_value_t = 15.0)]
        bass_gain_db: f32,

        /// Brainwave right-channel delay in milliseconds
        #[arg(long, default_value_t = 15.0)]
        brainwave_delay_ms: f32,

        /// MP3 export bitrate
        #[arg(long, default_value = "320k")]
        bitrate: String,
    },

    /// Show metadata for an audio file
    #[command(name = "inspect")]
    Inspect {
        /// Audio file to probe
        input: PathBuf,
    },

    /// Verify the ffmpeg binary is available
    #[command(name = "check")]
    Check,
}
