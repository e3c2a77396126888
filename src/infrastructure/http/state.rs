//! Application State

use std::sync::Arc;

use crate::application::ports::{AudioTranscoderPort, ToneSynthesizerPort};
use crate::config::AppConfig;

/// Shared, read-only request-handling state.
///
/// Everything here is established at startup; requests never mutate it.
pub struct AppState {
    /// Base URL advertised by the index endpoint
    pub public_base_url: String,
    /// Default sample rate when the request omits `rate`
    pub default_rate: u32,
    /// Default clip duration when the request omits `duration`
    pub default_duration_secs: f64,

    pub synthesizer: Arc<dyn ToneSynthesizerPort>,
    pub transcoder: Arc<dyn AudioTranscoderPort>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        synthesizer: Arc<dyn ToneSynthesizerPort>,
        transcoder: Arc<dyn AudioTranscoderPort>,
    ) -> Self {
        Self {
            public_base_url: config.server.public_base_url(),
            default_rate: config.audio.default_rate,
            default_duration_secs: config.audio.default_duration_secs,
            synthesizer,
            transcoder,
        }
    }
}
