//! Application Layer
//!
//! Outbound port definitions for the audio collaborators.

pub mod ports;

pub use ports::*;
