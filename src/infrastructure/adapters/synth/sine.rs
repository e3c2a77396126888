//! Sine Synthesizer
//!
//! Renders a mono sine tone as 16-bit PCM and packages it as a WAV
//! container.

use std::f64::consts::PI;

use crate::application::ports::{SynthesisError, ToneSynthesizerPort};

/// Longest clip the synthesizer will render.
const MAX_DURATION_SECS: f64 = 600.0;

/// Sine tone synthesizer
pub struct SineSynthesizer {
    /// Amplitude relative to full scale, clamped to [0, 1]
    amplitude: f32,
}

impl SineSynthesizer {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude: amplitude.clamp(0.0, 1.0),
        }
    }
}

impl Default for SineSynthesizer {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl ToneSynthesizerPort for SineSynthesizer {
    fn synthesize(
        &self,
        frequency_hz: f64,
        duration_secs: f64,
        sample_rate: u32,
    ) -> Result<Vec<u8>, SynthesisError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(SynthesisError::InvalidFrequency(frequency_hz));
        }
        if !duration_secs.is_finite()
            || duration_secs <= 0.0
            || duration_secs > MAX_DURATION_SECS
        {
            return Err(SynthesisError::InvalidDuration(duration_secs));
        }
        if sample_rate == 0 {
            return Err(SynthesisError::InvalidSampleRate(sample_rate));
        }

        let num_samples = (duration_secs * sample_rate as f64).round() as usize;
        let phase_step = 2.0 * PI * frequency_hz / sample_rate as f64;
        let amplitude = self.amplitude as f64 * i16::MAX as f64;

        let samples: Vec<i16> = (0..num_samples)
            .map(|n| ((phase_step * n as f64).sin() * amplitude) as i16)
            .collect();

        Ok(encode_pcm16_wav(&samples, sample_rate, 1))
    }
}

/// Package interleaved 16-bit PCM samples as a WAV byte stream.
pub fn encode_pcm16_wav(samples: &[i16], sample_rate: u32, num_channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    let data_size = samples.len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_samples(wav: &[u8]) -> Vec<i16> {
        wav[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn test_wav_container_layout() {
        let wav = SineSynthesizer::default()
            .synthesize(440.0, 1.0, 44_100)
            .unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sample_rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sample_rate, 44_100);

        let channels = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(channels, 1);

        // 1 second of mono 16-bit PCM
        assert_eq!(wav.len(), 44 + 44_100 * 2);
    }

    #[test]
    fn test_sine_pitch_via_zero_crossings() {
        let wav = SineSynthesizer::default()
            .synthesize(440.0, 1.0, 44_100)
            .unwrap();
        let samples = pcm_samples(&wav);

        let crossings = samples
            .windows(2)
            .filter(|w| (w[0] >= 0) != (w[1] >= 0))
            .count();

        // A sine at f Hz crosses zero 2f times per second.
        assert!((870..=890).contains(&crossings), "crossings = {}", crossings);
    }

    #[test]
    fn test_first_sample_is_zero() {
        let wav = SineSynthesizer::default()
            .synthesize(440.0, 0.1, 8000)
            .unwrap();
        assert_eq!(pcm_samples(&wav)[0], 0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let synth = SineSynthesizer::default();
        assert!(synth.synthesize(0.0, 1.0, 44_100).is_err());
        assert!(synth.synthesize(440.0, 0.0, 44_100).is_err());
        assert!(synth.synthesize(440.0, -1.0, 44_100).is_err());
        assert!(synth.synthesize(440.0, 1e9, 44_100).is_err());
        assert!(synth.synthesize(440.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_amplitude_is_clamped() {
        let wav = SineSynthesizer::new(5.0).synthesize(440.0, 0.5, 8000).unwrap();
        let peak = pcm_samples(&wav).iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= i16::MAX as u16);
    }
}
