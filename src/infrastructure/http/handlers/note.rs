//! Note Handlers
//!
//! The synthesis pipeline: note path segment + query parameters in,
//! encoded audio bytes out.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use std::str::FromStr;
use std::sync::Arc;

use crate::application::ports::{AudioFormat, TranscodeConfig};
use crate::domain::{parse_note_segment, Note};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// Fixed encoding parameters for the Alexa endpoint: 48 kbps MPEG-2
/// layer III at 16 kHz, five seconds.
const ALEXA_RATE: u32 = 16_000;
const ALEXA_DURATION_SECS: f64 = 5.0;
const ALEXA_BITRATE: u32 = 48_000;

/// Resolved request parameters for the synthesis pipeline.
#[derive(Debug)]
struct NoteRequest {
    format: AudioFormat,
    rate: u32,
    duration_secs: f64,
    octave: i32,
    sharp: i32,
    flat: i32,
    bitrate: Option<u32>,
}

impl NoteRequest {
    /// Apply defaults and parse the pipeline parameters. Any value that
    /// fails to parse is a 400.
    fn from_params(params: &[(String, String)], state: &AppState) -> Result<Self, ApiError> {
        let format = match lookup(params, "format") {
            None => AudioFormat::Wav,
            Some(raw) => AudioFormat::from_str(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        };

        let rate = parse_param::<u32>(params, "rate")?.unwrap_or(state.default_rate);
        if rate == 0 {
            return Err(ApiError::BadRequest("Sample rate cannot be 0".to_string()));
        }

        let duration_secs =
            parse_param::<f64>(params, "duration")?.unwrap_or(state.default_duration_secs);
        if !(duration_secs > 0.0) {
            return Err(ApiError::BadRequest(
                "Duration must be positive".to_string(),
            ));
        }

        Ok(Self {
            format,
            rate,
            duration_secs,
            octave: parse_param::<i32>(params, "octave")?.unwrap_or(4),
            sharp: parse_param::<i32>(params, "sharp")?.unwrap_or(0),
            flat: parse_param::<i32>(params, "flat")?.unwrap_or(0),
            bitrate: None,
        })
    }

    /// Fixed parameters for the Alexa endpoint, regardless of what the
    /// client sent.
    fn alexa() -> Self {
        Self {
            format: AudioFormat::Mp3,
            rate: ALEXA_RATE,
            duration_secs: ALEXA_DURATION_SECS,
            octave: 4,
            sharp: 0,
            flat: 0,
            bitrate: Some(ALEXA_BITRATE),
        }
    }
}

/// Synthesize a note and return it as an audio file download.
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(note): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let request = NoteRequest::from_params(&params, &state)?;
    render_note(&state, &note, request, params).await
}

/// Note synthesis with fixed encoding parameters for Alexa playback.
pub async fn alexa_note(
    State(state): State<Arc<AppState>>,
    Path(note): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    render_note(&state, &note, NoteRequest::alexa(), params).await
}

/// Shared pipeline: note → frequency → WAV → (transcode) → response.
async fn render_note(
    state: &AppState,
    note_segment: &str,
    request: NoteRequest,
    raw_params: Vec<(String, String)>,
) -> Result<Response, ApiError> {
    // Tolerate client URLs that append a file extension ("C.wav").
    let name = note_segment.split('.').next().unwrap_or(note_segment);

    let (letter, embedded_octave) = parse_note_segment(name)?;
    let note = Note {
        letter,
        semitone_shift: request.sharp - request.flat,
        // A path like "C4" carries its own octave, which wins over the
        // query parameter.
        octave: embedded_octave.unwrap_or(request.octave),
    };

    let frequency_hz = note.frequency();

    tracing::debug!(
        letter = %note.letter,
        octave = note.octave,
        shift = note.semitone_shift,
        frequency_hz = frequency_hz,
        format = %request.format,
        rate = request.rate,
        duration_secs = request.duration_secs,
        "Synthesizing note"
    );

    let wav = state
        .synthesizer
        .synthesize(frequency_hz, request.duration_secs, request.rate)?;

    let config = TranscodeConfig {
        format: request.format,
        bitrate: request.bitrate,
        options: raw_params,
    };
    let result = state.transcoder.transcode(&wav, &config).await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.format.mime_type())
        .header(header::CONTENT_LENGTH, result.audio_data.len())
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(result.audio_data))
        .unwrap())
}

fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Parse an optional query parameter; a present-but-malformed value is a
/// 400, an absent one is `None`.
fn parse_param<T: FromStr>(
    params: &[(String, String)],
    key: &str,
) -> Result<Option<T>, ApiError> {
    match lookup(params, key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            ApiError::BadRequest(format!("Invalid value for {:?}: {:?}", key, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::infrastructure::adapters::{SineSynthesizer, WavTranscoder};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn state() -> AppState {
        AppState::new(
            &AppConfig::default(),
            Arc::new(SineSynthesizer::default()),
            Arc::new(WavTranscoder::new()),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let request = NoteRequest::from_params(&[], &state()).unwrap();
        assert_eq!(request.format, AudioFormat::Wav);
        assert_eq!(request.rate, 44_100);
        assert_eq!(request.duration_secs, 2.0);
        assert_eq!(request.octave, 4);
        assert_eq!(request.sharp, 0);
        assert_eq!(request.flat, 0);
    }

    #[test]
    fn test_explicit_params() {
        let request = NoteRequest::from_params(
            &params(&[
                ("format", "opus"),
                ("rate", "22050"),
                ("duration", "0.5"),
                ("octave", "3"),
                ("sharp", "1"),
            ]),
            &state(),
        )
        .unwrap();
        assert_eq!(request.format, AudioFormat::Opus);
        assert_eq!(request.rate, 22_050);
        assert_eq!(request.duration_secs, 0.5);
        assert_eq!(request.octave, 3);
        assert_eq!(request.sharp, 1);
    }

    #[test]
    fn test_unparseable_rate_is_bad_request() {
        let result = NoteRequest::from_params(&params(&[("rate", "fast")]), &state());
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_unknown_format_is_bad_request() {
        let result = NoteRequest::from_params(&params(&[("format", "flac")]), &state());
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_negative_duration_is_bad_request() {
        let result = NoteRequest::from_params(&params(&[("duration", "-1")]), &state());
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_alexa_parameters_are_fixed() {
        let request = NoteRequest::alexa();
        assert_eq!(request.format, AudioFormat::Mp3);
        assert_eq!(request.rate, 16_000);
        assert_eq!(request.duration_secs, 5.0);
        assert_eq!(request.bitrate, Some(48_000));
    }
}
