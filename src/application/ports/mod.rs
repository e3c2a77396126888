//! Application Ports
//!
//! Abstract interfaces between the request pipeline and the audio
//! collaborators (synthesis and transcoding).

mod synthesizer;
mod transcoder;

pub use synthesizer::{SynthesisError, ToneSynthesizerPort};
pub use transcoder::{
    AudioFormat, AudioInfo, AudioTranscoderPort, TranscodeConfig, TranscodeError, TranscodeResult,
};
