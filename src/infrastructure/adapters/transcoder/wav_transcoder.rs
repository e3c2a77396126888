//! WAV Transcoder
//!
//! symphonia-based converter taking a WAV byte stream to:
//! - WAV pass-through
//! - Opus in an Ogg container (RFC 7845)
//! - MP3 via LAME

use async_trait::async_trait;
use mp3lame_encoder::{Builder as LameBuilder, FlushNoGap, InterleavedPcm, MonoPcm};
use ogg::writing::PacketWriter;
use opus::{Application, Channels, Encoder};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{
    AudioFormat, AudioInfo, AudioTranscoderPort, TranscodeConfig, TranscodeError, TranscodeResult,
};

/// Query keys consumed by the request pipeline before the converter
/// sees them; silently skipped in the passthrough option map.
const PIPELINE_KEYS: &[&str] = &["format", "rate", "duration", "octave", "sharp", "flat"];

const DEFAULT_OPUS_BITRATE: u32 = 32_000;
const DEFAULT_MP3_BITRATE: u32 = 128_000;

/// WAV transcoder
pub struct WavTranscoder;

impl WavTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the effective bitrate from the config and the whitelisted
    /// client options. Unknown option keys are ignored with a warning.
    fn effective_bitrate(&self, config: &TranscodeConfig) -> Result<Option<u32>, TranscodeError> {
        let mut bitrate = config.bitrate;
        for (key, value) in &config.options {
            if PIPELINE_KEYS.contains(&key.as_str()) {
                continue;
            }
            match key.as_str() {
                "bitrate" => {
                    bitrate = Some(value.parse::<u32>().map_err(|_| {
                        TranscodeError::InvalidOption(format!("bitrate: {:?}", value))
                    })?);
                }
                _ => {
                    tracing::warn!(option = %key, "Ignoring unsupported converter option");
                }
            }
        }
        Ok(bitrate)
    }

    /// Parse the RIFF/WAVE header of `data`.
    fn parse_wav_header(&self, data: &[u8]) -> Result<WavHeader, TranscodeError> {
        if data.len() < 44 {
            return Err(TranscodeError::InvalidInput(
                "WAV data too short".to_string(),
            ));
        }
        if &data[0..4] != b"RIFF" {
            return Err(TranscodeError::InvalidInput(
                "Invalid WAV: missing RIFF header".to_string(),
            ));
        }
        if &data[8..12] != b"WAVE" {
            return Err(TranscodeError::InvalidInput(
                "Invalid WAV: missing WAVE identifier".to_string(),
            ));
        }

        let mut pos = 12;
        let mut fmt_chunk: Option<FmtChunk> = None;
        let mut data_size = 0;

        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size =
                u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                    as usize;

            match chunk_id {
                b"fmt " => {
                    if chunk_size < 16 || pos + 8 + 16 > data.len() {
                        return Err(TranscodeError::InvalidInput(
                            "Invalid fmt chunk size".to_string(),
                        ));
                    }
                    let fmt = &data[pos + 8..pos + 8 + 16];
                    fmt_chunk = Some(FmtChunk {
                        num_channels: u16::from_le_bytes([fmt[2], fmt[3]]),
                        sample_rate: u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]),
                        bits_per_sample: u16::from_le_bytes([fmt[14], fmt[15]]),
                    });
                }
                b"data" => {
                    data_size = chunk_size;
                    break;
                }
                _ => {}
            }

            pos += 8 + chunk_size;
            // Chunks are padded to even byte boundaries.
            if chunk_size % 2 != 0 {
                pos += 1;
            }
        }

        let fmt = fmt_chunk.ok_or_else(|| {
            TranscodeError::InvalidInput("Invalid WAV: missing fmt chunk".to_string())
        })?;

        if data_size == 0 {
            return Err(TranscodeError::InvalidInput(
                "Invalid WAV: missing data chunk".to_string(),
            ));
        }

        Ok(WavHeader { fmt, data_size })
    }

    /// Decode a WAV stream into interleaved f32 PCM via symphonia.
    fn decode_wav_to_pcm(&self, data: &[u8]) -> Result<DecodedAudio, TranscodeError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TranscodeError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| TranscodeError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| TranscodeError::DecodingError("Unknown sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u8)
            .ok_or_else(|| TranscodeError::DecodingError("Unknown channel count".to_string()))?;

        let decoder_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &decoder_opts)
            .map_err(|e| {
                TranscodeError::DecodingError(format!("Decoder creation failed: {}", e))
            })?;

        let mut samples: Vec<f32> = Vec::new();
        let track_id = track.id;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(TranscodeError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            // Only the rendered frames, not the buffer capacity.
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        let duration_ms = if sample_rate > 0 && channels > 0 {
            (samples.len() as u64 * 1000) / (sample_rate as u64 * channels as u64)
        } else {
            0
        };

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
            duration_ms,
        })
    }

    /// Encode f32 PCM as Opus in an Ogg container.
    fn encode_opus(&self, pcm: &DecodedAudio, bitrate: u32) -> Result<Vec<u8>, TranscodeError> {
        let target_rate = opus_compatible_sample_rate(pcm.sample_rate);
        let (samples, sample_rate) = if target_rate != pcm.sample_rate {
            (
                resample(&pcm.samples, pcm.sample_rate, target_rate, pcm.channels),
                target_rate,
            )
        } else {
            (pcm.samples.clone(), pcm.sample_rate)
        };

        // Opus only does mono or stereo.
        let (channels, channel_count) = if pcm.channels == 1 {
            (Channels::Mono, 1usize)
        } else {
            (Channels::Stereo, 2usize)
        };

        let mut encoder = Encoder::new(sample_rate, channels, Application::Audio).map_err(|e| {
            TranscodeError::EncodingError(format!("Failed to create Opus encoder: {}", e))
        })?;

        encoder
            .set_bitrate(opus::Bitrate::Bits(bitrate as i32))
            .map_err(|e| TranscodeError::EncodingError(format!("Failed to set bitrate: {}", e)))?;

        // Encoder delay becomes the OpusHead pre-skip.
        let pre_skip = encoder.get_lookahead().map(|l| l as u16).unwrap_or(312);

        let pcm_i16: Vec<i16> = samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect();

        // 20 ms frames
        let frame_size = (sample_rate as usize * 20) / 1000;
        let samples_per_frame = frame_size * channel_count;

        let mut ogg_data = Vec::new();
        {
            let mut packet_writer = PacketWriter::new(&mut ogg_data);

            let opus_head = opus_head_packet(channel_count as u8, sample_rate, pre_skip);
            packet_writer
                .write_packet(opus_head, 0, ogg::PacketWriteEndInfo::EndPage, 0)
                .map_err(|e| {
                    TranscodeError::EncodingError(format!("Failed to write Opus head: {}", e))
                })?;

            let opus_tags = opus_tags_packet();
            packet_writer
                .write_packet(opus_tags, 0, ogg::PacketWriteEndInfo::EndPage, 0)
                .map_err(|e| {
                    TranscodeError::EncodingError(format!("Failed to write Opus tags: {}", e))
                })?;

            // Opus max packet size
            let mut output_buf = vec![0u8; 4000];

            // Granule positions count 48 kHz samples regardless of the
            // input rate (RFC 7845 §4).
            let granule_scale = 48_000.0 / sample_rate as f64;
            let frame_granule = (frame_size as f64 * granule_scale) as u64;
            let mut granule_pos: u64 = (pre_skip as f64 * granule_scale) as u64;

            let chunks: Vec<_> = pcm_i16.chunks(samples_per_frame).collect();
            // Extra silent frames to drain the encoder's lookahead buffer.
            let flush_frames = (pre_skip as usize + samples_per_frame - 1) / samples_per_frame;

            for chunk in chunks {
                let frame = if chunk.len() < samples_per_frame {
                    let mut padded = chunk.to_vec();
                    padded.resize(samples_per_frame, 0);
                    padded
                } else {
                    chunk.to_vec()
                };

                let encoded_len = encoder.encode(&frame, &mut output_buf).map_err(|e| {
                    TranscodeError::EncodingError(format!("Opus encode failed: {}", e))
                })?;

                granule_pos += frame_granule;
                packet_writer
                    .write_packet(
                        output_buf[..encoded_len].to_vec(),
                        0,
                        ogg::PacketWriteEndInfo::NormalPacket,
                        granule_pos,
                    )
                    .map_err(|e| {
                        TranscodeError::EncodingError(format!("Failed to write Opus packet: {}", e))
                    })?;
            }

            let silence_frame = vec![0i16; samples_per_frame];
            for flush_idx in 0..flush_frames {
                let encoded_len = encoder.encode(&silence_frame, &mut output_buf).map_err(|e| {
                    TranscodeError::EncodingError(format!("Opus flush encode failed: {}", e))
                })?;

                granule_pos += frame_granule;
                let end_info = if flush_idx == flush_frames - 1 {
                    ogg::PacketWriteEndInfo::EndStream
                } else {
                    ogg::PacketWriteEndInfo::NormalPacket
                };

                packet_writer
                    .write_packet(
                        output_buf[..encoded_len].to_vec(),
                        0,
                        end_info,
                        granule_pos,
                    )
                    .map_err(|e| {
                        TranscodeError::EncodingError(format!(
                            "Failed to write Opus flush packet: {}",
                            e
                        ))
                    })?;
            }
        }

        Ok(ogg_data)
    }

    /// Encode f32 PCM as MP3 via LAME.
    fn encode_mp3(&self, pcm: &DecodedAudio, bitrate: u32) -> Result<Vec<u8>, TranscodeError> {
        let mut builder = LameBuilder::new().ok_or_else(|| {
            TranscodeError::EncodingError("Failed to create LAME builder".to_string())
        })?;

        builder
            .set_num_channels(pcm.channels)
            .map_err(|e| TranscodeError::EncodingError(format!("LAME channels: {:?}", e)))?;
        builder
            .set_sample_rate(pcm.sample_rate)
            .map_err(|e| TranscodeError::EncodingError(format!("LAME sample rate: {:?}", e)))?;
        builder
            .set_brate(nearest_mp3_bitrate(bitrate))
            .map_err(|e| TranscodeError::EncodingError(format!("LAME bitrate: {:?}", e)))?;
        builder
            .set_quality(mp3lame_encoder::Quality::Good)
            .map_err(|e| TranscodeError::EncodingError(format!("LAME quality: {:?}", e)))?;

        let mut encoder = builder
            .build()
            .map_err(|e| TranscodeError::EncodingError(format!("LAME init: {:?}", e)))?;

        let pcm_i16: Vec<i16> = pcm
            .samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect();

        let mut mp3_out: Vec<u8> =
            Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(pcm_i16.len()));

        let encoded = if pcm.channels == 1 {
            encoder.encode(MonoPcm(&pcm_i16), mp3_out.spare_capacity_mut())
        } else {
            encoder.encode(InterleavedPcm(&pcm_i16), mp3_out.spare_capacity_mut())
        }
        .map_err(|e| TranscodeError::EncodingError(format!("MP3 encode failed: {:?}", e)))?;
        // SAFETY: the encoder initialized `encoded` bytes of spare capacity.
        unsafe {
            mp3_out.set_len(mp3_out.len() + encoded);
        }

        let flushed = encoder
            .flush::<FlushNoGap>(mp3_out.spare_capacity_mut())
            .map_err(|e| TranscodeError::EncodingError(format!("MP3 flush failed: {:?}", e)))?;
        // SAFETY: as above, for the flushed tail.
        unsafe {
            mp3_out.set_len(mp3_out.len() + flushed);
        }

        Ok(mp3_out)
    }
}

impl Default for WavTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest sample rate the Opus codec accepts.
fn opus_compatible_sample_rate(sample_rate: u32) -> u32 {
    match sample_rate {
        8000 | 12_000 | 16_000 | 24_000 | 48_000 => sample_rate,
        r if r <= 8000 => 8000,
        r if r <= 12_000 => 12_000,
        r if r <= 16_000 => 16_000,
        r if r <= 24_000 => 24_000,
        _ => 48_000,
    }
}

/// Linear-interpolation resampler over interleaved samples.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32, channels: u8) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let channel_count = channels.max(1) as usize;
    let frame_count = samples.len() / channel_count;
    let new_frame_count = (frame_count as f64 * ratio) as usize;
    let mut resampled = Vec::with_capacity(new_frame_count * channel_count);

    for i in 0..new_frame_count {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        for ch in 0..channel_count {
            let idx0 = src_idx * channel_count + ch;
            let idx1 = (src_idx + 1).min(frame_count.saturating_sub(1)) * channel_count + ch;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            resampled.push(s0 + (s1 - s0) * frac as f32);
        }
    }

    resampled
}

/// OpusHead identification packet (RFC 7845 §5.1).
fn opus_head_packet(channels: u8, sample_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // version
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&sample_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // channel mapping family
    head
}

/// OpusTags comment packet.
fn opus_tags_packet() -> Vec<u8> {
    let vendor = "pitchpipe";
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes()); // no user comments
    tags
}

/// Closest constant bitrate LAME supports.
fn nearest_mp3_bitrate(bps: u32) -> mp3lame_encoder::Bitrate {
    use mp3lame_encoder::Bitrate::*;
    match bps {
        0..=8_000 => Kbps8,
        8_001..=16_000 => Kbps16,
        16_001..=24_000 => Kbps24,
        24_001..=32_000 => Kbps32,
        32_001..=40_000 => Kbps40,
        40_001..=48_000 => Kbps48,
        48_001..=64_000 => Kbps64,
        64_001..=80_000 => Kbps80,
        80_001..=96_000 => Kbps96,
        96_001..=112_000 => Kbps112,
        112_001..=128_000 => Kbps128,
        128_001..=160_000 => Kbps160,
        160_001..=192_000 => Kbps192,
        192_001..=224_000 => Kbps224,
        224_001..=256_000 => Kbps256,
        _ => Kbps320,
    }
}

#[derive(Debug)]
struct WavHeader {
    fmt: FmtChunk,
    data_size: usize,
}

#[derive(Debug)]
struct FmtChunk {
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

#[derive(Debug)]
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u8,
    duration_ms: u64,
}

#[async_trait]
impl AudioTranscoderPort for WavTranscoder {
    async fn transcode(
        &self,
        wav_data: &[u8],
        config: &TranscodeConfig,
    ) -> Result<TranscodeResult, TranscodeError> {
        let original_size = wav_data.len();
        let bitrate = self.effective_bitrate(config)?;

        if config.format == AudioFormat::Wav {
            let info = self.get_audio_info(wav_data)?;
            return Ok(TranscodeResult {
                audio_data: wav_data.to_vec(),
                format: AudioFormat::Wav,
                duration_ms: info.duration_ms,
                sample_rate: info.sample_rate,
                channels: info.channels,
                original_size,
                transcoded_size: original_size,
            });
        }

        let decoded = self.decode_wav_to_pcm(wav_data)?;

        let audio_data = match config.format {
            AudioFormat::Wav => unreachable!("handled above"),
            AudioFormat::Opus => {
                self.encode_opus(&decoded, bitrate.unwrap_or(DEFAULT_OPUS_BITRATE))?
            }
            AudioFormat::Mp3 => {
                self.encode_mp3(&decoded, bitrate.unwrap_or(DEFAULT_MP3_BITRATE))?
            }
        };

        tracing::debug!(
            format = %config.format,
            original_size = original_size,
            transcoded_size = audio_data.len(),
            "Transcoded audio"
        );

        Ok(TranscodeResult {
            transcoded_size: audio_data.len(),
            audio_data,
            format: config.format,
            duration_ms: decoded.duration_ms,
            sample_rate: decoded.sample_rate,
            channels: decoded.channels,
            original_size,
        })
    }

    fn get_audio_info(&self, wav_data: &[u8]) -> Result<AudioInfo, TranscodeError> {
        let header = self.parse_wav_header(wav_data)?;

        let samples_per_channel = if header.fmt.bits_per_sample > 0 && header.fmt.num_channels > 0 {
            header.data_size
                / (header.fmt.bits_per_sample as usize / 8)
                / header.fmt.num_channels as usize
        } else {
            0
        };

        let duration_ms = if header.fmt.sample_rate > 0 {
            (samples_per_channel as u64 * 1000) / header.fmt.sample_rate as u64
        } else {
            0
        };

        Ok(AudioInfo {
            duration_ms,
            sample_rate: header.fmt.sample_rate,
            channels: header.fmt.num_channels as u8,
            bits_per_sample: header.fmt.bits_per_sample,
            data_size: header.data_size,
        })
    }

    fn supports_format(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Wav | AudioFormat::Opus | AudioFormat::Mp3 => true,
        }
    }
}
