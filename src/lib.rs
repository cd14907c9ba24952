//! EchoSphere - 8D Audio Converter
//!
//! EchoSphere applies a fixed set of spatial/psychoacoustic effects to a
//! local audio file and exports the result as MP3:
//! - Pseudo-8D panning (ffmpeg `apulsator`)
//! - Bass boost (ffmpeg `equalizer`)
//! - Reverb (ffmpeg `aecho`)
//! - Binaural "brainwave" delay (native stereo channel delay)
//!
//! # Architecture
//!
//! Frequency-domain effects are not implemented here; they delegate to an
//! external `ffmpeg` binary. Audio is serialized to WAV, piped through
//! `ffmpeg -af <filter>`, and the filtered WAV is read back. Only the
//! brainwave effect touches samples directly.

pub mod cli;
pub mod effects;
pub mod engine;
pub mod error;
pub mod ffmpeg;
pub mod pipeline;

pub use error::{EchoSphereError, Result};
