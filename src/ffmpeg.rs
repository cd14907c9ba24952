//! External ffmpeg wrapper
//!
//! Every effect except the brainwave delay is an ffmpeg filter graph, so
//! this module is the heart of the system: serialize audio to WAV, pipe it
//! through `ffmpeg -af <filter>`, read the filtered WAV back. Decoding of
//! arbitrary input formats and MP3 encoding go through the same binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};

use crate::engine::buffer::AudioBuffer;
use crate::engine::io;
use crate::error::{EchoSphereError, Result};

/// Environment variable overriding the ffmpeg binary location
pub const FFMPEG_ENV_VAR: &str = "ECHOSPHERE_FFMPEG";

/// Keep only this much ffmpeg stderr in error messages
const STDERR_LIMIT: usize = 2000;

/// Handle to the external ffmpeg binary
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    path: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ffmpeg"),
        }
    }
}

impl Ffmpeg {
    /// Create a handle for a specific ffmpeg binary
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a handle, honoring the `ECHOSPHERE_FFMPEG` override
    pub fn from_env() -> Self {
        match std::env::var_os(FFMPEG_ENV_VAR) {
            Some(path) => Self::new(PathBuf::from(path)),
            None => Self::default(),
        }
    }

    /// Path to the configured binary
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path to the sibling ffprobe binary
    fn ffprobe_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if dir != Path::new("") => dir.join("ffprobe"),
            _ => PathBuf::from("ffprobe"),
        }
    }

    /// Verify the binary can be spawned
    pub fn check(&self) -> Result<()> {
        let status = Command::new(&self.path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|_| EchoSphereError::FfmpegNotFound {
                path: self.path.display().to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(EchoSphereError::FfmpegNotFound {
                path: self.path.display().to_string(),
            })
        }
    }

    /// Decode any supported input file to 16-bit PCM WAV bytes
    pub fn decode_to_wav(&self, input: &Path) -> Result<Vec<u8>> {
        let args: [&std::ffi::OsStr; 7] = [
            "-i".as_ref(),
            input.as_os_str(),
            "-f".as_ref(),
            "wav".as_ref(),
            "-c:a".as_ref(),
            "pcm_s16le".as_ref(),
            "pipe:1".as_ref(),
        ];

        self.run(&args, None).map_err(|e| match e {
            // A decode failure means ffmpeg rejected the input, not that the
            // tool is broken.
            EchoSphereError::FfmpegFailed { stderr, .. } => EchoSphereError::InvalidAudio {
                reason: stderr,
                source: None,
            },
            other => other,
        })
    }

    /// Pipe WAV bytes through an audio filter graph
    ///
    /// Matches the original invocation:
    /// `ffmpeg -y -i pipe:0 -af <filter> -f wav pipe:1`
    pub fn filter_wav(&self, wav: &[u8], filter: &str) -> Result<Vec<u8>> {
        let args: [&std::ffi::OsStr; 8] = [
            "-y".as_ref(),
            "-i".as_ref(),
            "pipe:0".as_ref(),
            "-af".as_ref(),
            filter.as_ref(),
            "-f".as_ref(),
            "wav".as_ref(),
            "pipe:1".as_ref(),
        ];

        self.run(&args, Some(wav))
    }

    /// Apply a filter graph to an AudioBuffer
    pub fn run_filter(&self, buffer: &AudioBuffer, filter: &str) -> Result<AudioBuffer> {
        debug!("Applying filter: {}", filter);
        let wav = io::encode_wav(buffer)?;
        let filtered = self.filter_wav(&wav, filter)?;
        io::decode_wav(&filtered)
    }

    /// Encode WAV bytes to an MP3 file
    pub fn encode_mp3(&self, wav: &[u8], output: &Path, bitrate: &str) -> Result<()> {
        let args: [&std::ffi::OsStr; 10] = [
            "-y".as_ref(),
            "-f".as_ref(),
            "wav".as_ref(),
            "-i".as_ref(),
            "pipe:0".as_ref(),
            "-b:a".as_ref(),
            bitrate.as_ref(),
            "-f".as_ref(),
            "mp3".as_ref(),
            output.as_os_str(),
        ];

        self.run(&args, Some(wav)).map_err(|e| match e {
            EchoSphereError::FfmpegFailed { stderr, .. } => {
                warn!("MP3 encode failed: {}", stderr);
                EchoSphereError::ExportFailed {
                    path: output.display().to_string(),
                }
            }
            other => other,
        })?;

        Ok(())
    }

    /// Probe an audio file for metadata via ffprobe
    pub fn probe(&self, input: &Path) -> Result<AudioMetadata> {
        let output = Command::new(self.ffprobe_path())
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|_| EchoSphereError::FfmpegNotFound {
                path: self.ffprobe_path().display().to_string(),
            })?;

        if !output.status.success() {
            return Err(EchoSphereError::ProbeFailed {
                reason: truncate_stderr(&output.stderr),
            });
        }

        let probe_data: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| EchoSphereError::ProbeFailed {
                reason: format!("invalid JSON: {}", e),
            })?;

        Ok(AudioMetadata::from_probe(&probe_data))
    }

    /// Spawn ffmpeg, optionally feeding stdin, and collect stdout
    ///
    /// stdin is written from a separate thread; with both ends piped a
    /// single-threaded write-then-read deadlocks once the pipe buffers fill.
    fn run(&self, args: &[&std::ffi::OsStr], stdin_bytes: Option<&[u8]>) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.path);
        cmd.args(args)
            .stdin(if stdin_bytes.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Spawning: {} {:?}", self.path.display(), args);

        let mut child = cmd.spawn().map_err(|_| EchoSphereError::FfmpegNotFound {
            path: self.path.display().to_string(),
        })?;

        let writer = match stdin_bytes {
            Some(bytes) => {
                let mut stdin = child.stdin.take().ok_or_else(|| {
                    EchoSphereError::ProcessingError {
                        reason: "failed to open ffmpeg stdin".to_string(),
                    }
                })?;
                let bytes = bytes.to_vec();
                Some(thread::spawn(move || {
                    // A broken pipe here just means ffmpeg bailed early;
                    // the exit status below carries the real error.
                    let _ = stdin.write_all(&bytes);
                }))
            }
            None => None,
        };

        let output = child.wait_with_output()?;

        if let Some(handle) = writer {
            let _ = handle.join();
        }

        if !output.status.success() {
            return Err(EchoSphereError::FfmpegFailed {
                status: output.status.to_string(),
                stderr: truncate_stderr(&output.stderr),
            });
        }

        Ok(output.stdout)
    }
}

/// Keep the tail of ffmpeg's stderr; the useful line is always last
fn truncate_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() > STDERR_LIMIT {
        let start = text.len() - STDERR_LIMIT;
        // Don't split a UTF-8 character
        let start = (start..text.len())
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(start);
        format!("...{}", &text[start..])
    } else {
        text.to_string()
    }
}

/// Metadata returned by `ffprobe`
#[derive(Debug, Clone)]
pub struct AudioMetadata {
    pub format: String,
    pub duration_ms: u64,
    pub bitrate: Option<u64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

impl AudioMetadata {
    fn from_probe(probe_data: &serde_json::Value) -> Self {
        let format = probe_data
            .get("format")
            .and_then(|f| f.get("format_name"))
            .and_then(|n| n.as_str())
            .unwrap_or("unknown")
            .to_string();

        let duration_secs = probe_data
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        let bitrate = probe_data
            .get("format")
            .and_then(|f| f.get("bit_rate"))
            .and_then(|b| b.as_str())
            .and_then(|s| s.parse::<u64>().ok());

        let first_stream = probe_data
            .get("streams")
            .and_then(|s| s.as_array())
            .and_then(|arr| arr.first());

        let sample_rate = first_stream
            .and_then(|stream| stream.get("sample_rate"))
            .and_then(|sr| sr.as_str())
            .and_then(|s| s.parse::<u32>().ok());

        let channels = first_stream
            .and_then(|stream| stream.get("channels"))
            .and_then(|c| c.as_u64())
            .map(|c| c as u32);

        Self {
            format,
            duration_ms: (duration_secs * 1000.0) as u64,
            bitrate,
            sample_rate,
            channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_path() {
        let ffmpeg = Ffmpeg::default();
        assert_eq!(ffmpeg.path(), Path::new("ffmpeg"));
    }

    #[test]
    fn test_ffprobe_path_sibling() {
        let ffmpeg = Ffmpeg::new(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(
            ffmpeg.ffprobe_path(),
            PathBuf::from("/opt/ffmpeg/bin/ffprobe")
        );
    }

    #[test]
    fn test_ffprobe_path_bare() {
        let ffmpeg = Ffmpeg::default();
        assert_eq!(ffmpeg.ffprobe_path(), PathBuf::from("ffprobe"));
    }

    #[test]
    fn test_check_missing_binary() {
        let ffmpeg = Ffmpeg::new(PathBuf::from("/definitely/not/here/ffmpeg"));
        let result = ffmpeg.check();
        assert!(matches!(
            result,
            Err(EchoSphereError::FfmpegNotFound { .. })
        ));
    }

    #[test]
    fn test_truncate_stderr_short() {
        assert_eq!(truncate_stderr(b"  some error \n"), "some error");
    }

    #[test]
    fn test_truncate_stderr_long() {
        let long = vec![b'x'; STDERR_LIMIT + 500];
        let result = truncate_stderr(&long);
        assert!(result.starts_with("..."));
        assert_eq!(result.len(), STDERR_LIMIT + 3);
    }

    #[test]
    fn test_metadata_from_probe() {
        let probe = json!({
            "format": {
                "format_name": "mp3",
                "duration": "182.5",
                "bit_rate": "320000"
            },
            "streams": [
                { "sample_rate": "44100", "channels": 2 }
            ]
        });

        let meta = AudioMetadata::from_probe(&probe);
        assert_eq!(meta.format, "mp3");
        assert_eq!(meta.duration_ms, 182500);
        assert_eq!(meta.bitrate, Some(320000));
        assert_eq!(meta.sample_rate, Some(44100));
        assert_eq!(meta.channels, Some(2));
    }

    #[test]
    fn test_metadata_from_empty_probe() {
        let meta = AudioMetadata::from_probe(&json!({}));
        assert_eq!(meta.format, "unknown");
        assert_eq!(meta.duration_ms, 0);
        assert_eq!(meta.bitrate, None);
    }
}
