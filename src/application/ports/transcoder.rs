//! Audio Transcoder Port
//!
//! Abstraction over codec conversion: a WAV byte stream in, a re-encoded
//! byte stream in the requested format out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transcoding errors
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid converter option {0}")]
    InvalidOption(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// Audio output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Raw WAV, no transcoding
    #[default]
    Wav,
    /// Opus in an Ogg container
    Opus,
    /// MP3 (MPEG layer III)
    Mp3,
}

impl AudioFormat {
    /// MIME type for the encoded stream.
    ///
    /// Follows the registered types where they differ from the naive
    /// `audio/<format>` rule: Ogg-encapsulated Opus is `audio/ogg`, MP3
    /// is `audio/mpeg`.
    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Opus => "audio/ogg",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFormat::Wav => write!(f, "wav"),
            AudioFormat::Opus => write!(f, "opus"),
            AudioFormat::Mp3 => write!(f, "mp3"),
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "opus" => Ok(AudioFormat::Opus),
            "mp3" | "mpeg" => Ok(AudioFormat::Mp3),
            _ => Err(TranscodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Transcoding configuration
#[derive(Debug, Clone, Default)]
pub struct TranscodeConfig {
    /// Output format
    pub format: AudioFormat,
    /// Target bitrate (bps) for lossy formats. `None` picks the codec
    /// default. An explicit `bitrate` entry in `options` overrides this.
    pub bitrate: Option<u32>,
    /// Free-form client options, in query-string order. The converter
    /// whitelists the keys it understands and warns about the rest.
    pub options: Vec<(String, String)>,
}

/// Transcoding result
#[derive(Debug, Clone)]
pub struct TranscodeResult {
    /// Encoded audio bytes
    pub audio_data: Vec<u8>,
    /// Output format
    pub format: AudioFormat,
    /// Duration (ms)
    pub duration_ms: u64,
    /// Source sample rate (Hz)
    pub sample_rate: u32,
    /// Source channel count
    pub channels: u8,
    /// Input size (bytes)
    pub original_size: usize,
    /// Output size (bytes)
    pub transcoded_size: usize,
}

/// Audio Transcoder Port
#[async_trait]
pub trait AudioTranscoderPort: Send + Sync {
    /// Transcode a WAV byte stream into the configured format.
    ///
    /// A `Wav` target is a pass-through: the input bytes come back
    /// unchanged with their metadata filled in.
    async fn transcode(
        &self,
        wav_data: &[u8],
        config: &TranscodeConfig,
    ) -> Result<TranscodeResult, TranscodeError>;

    /// Inspect a WAV header without transcoding.
    fn get_audio_info(&self, wav_data: &[u8]) -> Result<AudioInfo, TranscodeError>;

    /// Whether the implementation can encode the given format.
    fn supports_format(&self, format: AudioFormat) -> bool;
}

/// WAV stream metadata
#[derive(Debug, Clone)]
pub struct AudioInfo {
    /// Duration (ms)
    pub duration_ms: u64,
    /// Sample rate (Hz)
    pub sample_rate: u32,
    /// Channel count
    pub channels: u8,
    /// Bit depth
    pub bits_per_sample: u16,
    /// PCM payload size (bytes)
    pub data_size: usize,
}
