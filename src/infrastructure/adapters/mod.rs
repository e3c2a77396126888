//! Infrastructure Adapters
//!
//! Concrete implementations of the audio ports.

pub mod synth;
pub mod transcoder;

pub use synth::*;
pub use transcoder::*;
