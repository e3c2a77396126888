//! Pitchpipe - note synthesis RESTful API
//!
//! Maps note names to equal-tempered frequencies, renders sine clips and
//! serves them over HTTP in WAV, Opus or MP3.
//!
//! Layers:
//! - `domain/`: the note model and frequency calculator
//! - `application/`: ports for the audio collaborators
//! - `infrastructure/`: adapters (synthesis, transcoding) and the axum
//!   HTTP surface
//! - `config/`: layered configuration loading

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
