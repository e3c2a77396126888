//! Audio Transcoding Adapter

mod wav_transcoder;

pub use wav_transcoder::WavTranscoder;
