//! Audio file I/O for EchoSphere
//!
//! Decoding and MP3 export both delegate to ffmpeg; this module owns the
//! WAV layer in between. ffmpeg hands us WAV bytes over a pipe, `hound`
//! parses them, and everything is converted to 32-bit float for the
//! effect pipeline.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{EchoSphereError, Result};
use crate::ffmpeg::Ffmpeg;

/// MP3 export bitrate used by the original exporter
pub const DEFAULT_MP3_BITRATE: &str = "320k";

/// Decode an audio file into an AudioBuffer
///
/// Accepts anything ffmpeg can read (MP3, WAV, FLAC, OGG, ...). The file is
/// piped through ffmpeg as 16-bit PCM WAV and parsed from memory. The source
/// sample rate is preserved.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If ffmpeg cannot decode the file
/// * `UnsupportedFormat` - If the audio has more than 2 channels
/// * `EmptyAudio` - If the decoded stream contains no samples
pub fn decode(ffmpeg: &Ffmpeg, path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(EchoSphereError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let wav_bytes = ffmpeg.decode_to_wav(path)?;
    let buffer = decode_wav(&wav_bytes)?;

    if buffer.is_empty() {
        return Err(EchoSphereError::EmptyAudio);
    }

    debug!(
        "Decoded {}: {} ch, {} Hz, {:.1}s",
        path.display(),
        buffer.num_channels(),
        buffer.sample_rate,
        buffer.duration_secs()
    );

    Ok(buffer)
}

/// Export an AudioBuffer as MP3
///
/// The buffer is serialized to WAV in memory and piped into an ffmpeg MP3
/// encode. `bitrate` uses ffmpeg notation ("320k", "192k", ...).
pub fn export_mp3(ffmpeg: &Ffmpeg, buffer: &AudioBuffer, path: &Path, bitrate: &str) -> Result<()> {
    if buffer.is_empty() {
        return Err(EchoSphereError::EmptyAudio);
    }

    let wav_bytes = encode_wav(buffer)?;
    ffmpeg.encode_mp3(&wav_bytes, path, bitrate)?;

    debug!("Exported {} at {}", path.display(), bitrate);
    Ok(())
}

/// Default output name for an input file: `<stem>_enhanced.mp3`
///
/// Matches the default save-as name the original offered.
pub fn default_export_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_enhanced.mp3", stem))
}

/// Serialize an AudioBuffer to 16-bit PCM WAV bytes
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let channels = buffer.num_channels() as u16;
    let interleaved = buffer.to_interleaved();

    let spec = WavSpec {
        channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;

    for sample in interleaved {
        let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(scaled).map_err(wav_error)?;
    }

    writer.finalize().map_err(wav_error)?;
    Ok(cursor.into_inner())
}

/// Parse WAV bytes into an AudioBuffer, converting samples to f32
///
/// Accepts the placeholder-size headers ffmpeg emits when muxing to a
/// pipe (it cannot seek back to patch the RIFF/data sizes), so the bytes
/// are normalized before hound sees them.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let bytes = normalize_streamed_wav(bytes);
    let reader =
        WavReader::new(Cursor::new(bytes.as_ref())).map_err(|e| EchoSphereError::InvalidAudio {
            reason: format!("Failed to parse WAV data: {}", e),
            source: Some(Box::new(e)),
        })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout =
        ChannelLayout::from_count(channels).ok_or_else(|| EchoSphereError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        })?;

    let samples_f32 = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    AudioBuffer::from_interleaved(&samples_f32, layout, spec.sample_rate)
}

/// Placeholder ffmpeg's wav muxer writes for sizes it cannot seek back to fix
const WAV_SIZE_PLACEHOLDER: u32 = 0xFFFF_FFFF;

/// Repair chunk sizes in WAV data that was muxed to a pipe
///
/// ffmpeg streaming to `pipe:1` leaves the RIFF and `data` chunk sizes as
/// 0xFFFFFFFF. hound rejects that outright, so rewrite both fields from the
/// actual byte count. The data size is additionally aligned down to a whole
/// frame in case the stream was cut mid-frame. Well-formed input passes
/// through untouched.
fn normalize_streamed_wav(bytes: &[u8]) -> std::borrow::Cow<'_, [u8]> {
    use std::borrow::Cow;

    let read_u32 = |b: &[u8], at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]);

    // Not a RIFF/WAVE container; let hound produce the error
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Cow::Borrowed(bytes);
    }

    let riff_size = read_u32(bytes, 4);
    let actual_riff_size = (bytes.len() - 8) as u32;

    let mut patched: Option<Vec<u8>> = None;
    if riff_size == WAV_SIZE_PLACEHOLDER || riff_size > actual_riff_size {
        let fixed = patched.get_or_insert_with(|| bytes.to_vec());
        fixed[4..8].copy_from_slice(&actual_riff_size.to_le_bytes());
    }

    // Walk the chunk list looking for the data chunk, picking up the frame
    // size from the fmt chunk on the way
    let mut block_align: usize = 0;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let chunk_id = &bytes[pos..pos + 4];
        let chunk_size = read_u32(bytes, pos + 4) as usize;
        let payload = pos + 8;

        if chunk_id == b"fmt " && payload + 14 <= bytes.len() {
            block_align = u16::from_le_bytes([bytes[payload + 12], bytes[payload + 13]]) as usize;
        }

        if chunk_id == b"data" {
            let remaining = bytes.len() - payload;
            if chunk_size == WAV_SIZE_PLACEHOLDER as usize || chunk_size > remaining {
                let mut data_size = remaining;
                if block_align > 0 {
                    data_size -= data_size % block_align;
                }
                let fixed = patched.get_or_insert_with(|| bytes.to_vec());
                fixed[pos + 4..pos + 8].copy_from_slice(&(data_size as u32).to_le_bytes());
                fixed.truncate(payload + data_size);
                let riff = (fixed.len() - 8) as u32;
                fixed[4..8].copy_from_slice(&riff.to_le_bytes());
            }
            break;
        }

        // Chunks are padded to even length
        pos = payload + chunk_size + (chunk_size & 1);
    }

    match patched {
        Some(fixed) => Cow::Owned(fixed),
        None => Cow::Borrowed(bytes),
    }
}

fn wav_error(e: hound::Error) -> EchoSphereError {
    EchoSphereError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| EchoSphereError::InvalidAudio {
                reason: format!("Failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| EchoSphereError::InvalidAudio {
                    reason: format!("Failed to read 16-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            24 => {
                // 24-bit stored as i32 in hound
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / 8388608.0))
                    .collect::<std::result::Result<Vec<f32>, _>>()
                    .map_err(|e| EchoSphereError::InvalidAudio {
                        reason: format!("Failed to read 24-bit samples: {}", e),
                        source: Some(Box::new(e)),
                    })
            }
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| EchoSphereError::InvalidAudio {
                    reason: format!("Failed to read 32-bit int samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            _ => Err(EchoSphereError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Generate a mono sine wave for tests
    fn test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono, sample_rate);

        let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
        for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
            *sample = 0.5 * (angular_freq * i as f32).sin();
        }

        buffer
    }

    #[test]
    fn test_wav_roundtrip_mono() {
        let original = test_tone(440.0, 0.5, 44100);

        let bytes = encode_wav(&original).unwrap();
        let decoded = decode_wav(&bytes).unwrap();

        assert_eq!(original.num_samples(), decoded.num_samples());
        assert_eq!(original.num_channels(), decoded.num_channels());
        assert_eq!(original.sample_rate, decoded.sample_rate);

        for (orig, dec) in original.channel(0).iter().zip(decoded.channel(0).iter()) {
            // 16-bit quantization error
            assert_abs_diff_eq!(orig, dec, epsilon = 0.001);
        }
    }

    #[test]
    fn test_wav_roundtrip_stereo() {
        let original = test_tone(440.0, 0.2, 48000).to_stereo().unwrap();

        let bytes = encode_wav(&original).unwrap();
        let decoded = decode_wav(&bytes).unwrap();

        assert_eq!(decoded.num_channels(), 2);
        assert_eq!(decoded.sample_rate, 48000);
        assert_eq!(original.num_samples(), decoded.num_samples());
    }

    #[test]
    fn test_wav_header_present() {
        let buffer = test_tone(1000.0, 0.1, 44100);
        let bytes = encode_wav(&buffer).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    /// Overwrite the RIFF and data chunk sizes the way ffmpeg's wav muxer
    /// leaves them when it writes to a pipe and cannot seek back
    fn blank_stream_sizes(bytes: &mut [u8]) {
        assert_eq!(&bytes[36..40], b"data");
        bytes[4..8].fill(0xFF);
        bytes[40..44].fill(0xFF);
    }

    #[test]
    fn test_decode_wav_piped_placeholder_sizes() {
        let original = test_tone(440.0, 0.3, 44100).to_stereo().unwrap();
        let mut bytes = encode_wav(&original).unwrap();
        blank_stream_sizes(&mut bytes);

        let decoded = decode_wav(&bytes).unwrap();

        assert_eq!(decoded.num_channels(), 2);
        assert_eq!(decoded.num_samples(), original.num_samples());
        for (orig, dec) in original.channel(0).iter().zip(decoded.channel(0).iter()) {
            assert_abs_diff_eq!(orig, dec, epsilon = 0.001);
        }
    }

    #[test]
    fn test_decode_wav_piped_partial_final_frame() {
        let original = test_tone(220.0, 0.1, 44100).to_stereo().unwrap();
        let mut bytes = encode_wav(&original).unwrap();
        blank_stream_sizes(&mut bytes);
        // A stream cut mid-frame leaves a dangling byte after the last
        // complete frame; it must be dropped, not rejected
        bytes.push(0x7F);

        let decoded = decode_wav(&bytes).unwrap();
        assert_eq!(decoded.num_samples(), original.num_samples());
    }

    #[test]
    fn test_well_formed_wav_left_untouched() {
        let bytes = encode_wav(&test_tone(440.0, 0.05, 44100)).unwrap();
        match normalize_streamed_wav(&bytes) {
            std::borrow::Cow::Borrowed(_) => {}
            std::borrow::Cow::Owned(_) => panic!("valid WAV should not be rewritten"),
        }
    }

    #[test]
    fn test_decode_wav_garbage() {
        let result = decode_wav(b"definitely not a wav file");
        assert!(matches!(result, Err(EchoSphereError::InvalidAudio { .. })));
    }

    #[test]
    fn test_decode_nonexistent_file() {
        let ffmpeg = Ffmpeg::default();
        let result = decode(&ffmpeg, Path::new("/nonexistent/path/audio.mp3"));

        match result.unwrap_err() {
            EchoSphereError::FileNotFound { path, .. } => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_export_empty_buffer_rejected() {
        let ffmpeg = Ffmpeg::default();
        let buffer = AudioBuffer::default();
        let result = export_mp3(&ffmpeg, &buffer, Path::new("/tmp/out.mp3"), "320k");
        assert!(matches!(result, Err(EchoSphereError::EmptyAudio)));
    }

    #[test]
    fn test_default_export_name() {
        let name = default_export_name(Path::new("/music/my song.flac"));
        assert_eq!(name, PathBuf::from("/music/my song_enhanced.mp3"));

        let name = default_export_name(Path::new("track.mp3"));
        assert_eq!(name, PathBuf::from("track_enhanced.mp3"));
    }
}
