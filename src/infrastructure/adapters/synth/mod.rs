//! Tone Synthesis Adapter

mod sine;

pub use sine::{encode_pcm16_wav, SineSynthesizer};
