//! Audio Engine Module
//!
//! Core audio handling:
//! - Audio buffer management
//! - WAV (de)serialization and MP3 export via ffmpeg

pub mod buffer;
pub mod io;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use io::{decode, default_export_name, export_mp3, DEFAULT_MP3_BITRATE};
