//! Tone Synthesizer Port
//!
//! Abstraction over waveform rendering: frequency + duration + sample
//! rate in, a complete WAV byte stream out.

use thiserror::Error;

/// Synthesis errors
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Invalid frequency: {0} Hz")]
    InvalidFrequency(f64),

    #[error("Invalid duration: {0} s")]
    InvalidDuration(f64),

    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
}

/// Tone Synthesizer Port
///
/// Implementations render a mono clip at the given fundamental frequency
/// and package it as a WAV container. Synthesis is CPU-bound and runs
/// synchronously on the caller's task.
pub trait ToneSynthesizerPort: Send + Sync {
    /// Render `duration_secs` of tone at `frequency_hz`, sampled at
    /// `sample_rate` Hz, as WAV bytes.
    fn synthesize(
        &self,
        frequency_hz: f64,
        duration_secs: f64,
        sample_rate: u32,
    ) -> Result<Vec<u8>, SynthesisError>;
}
