//! End-to-end router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::util::ServiceExt;

use pitchpipe::config::AppConfig;
use pitchpipe::infrastructure::adapters::{SineSynthesizer, WavTranscoder};
use pitchpipe::infrastructure::http::{create_routes, AppState};

fn app() -> Router {
    let state = AppState::new(
        &AppConfig::default(),
        Arc::new(SineSynthesizer::default()),
        Arc::new(WavTranscoder::new()),
    );
    create_routes().with_state(Arc::new(state))
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn pcm_samples(wav: &[u8]) -> Vec<i16> {
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(&wav[36..40], b"data");
    wav[44..]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

fn wav_sample_rate(wav: &[u8]) -> u32 {
    u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]])
}

#[tokio::test]
async fn test_root_lists_versions() {
    let (status, json) = get_json("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Pitchpipe RESTful API");
    assert_eq!(json["versions"]["v0"], "http://localhost:5000/v0");
}

#[tokio::test]
async fn test_route_listing() {
    let (status, json) = get_json("/v0").await;
    assert_eq!(status, StatusCode::OK);

    let routes = json["routes"].as_array().unwrap();
    assert!(!routes.is_empty());

    let names: Vec<&str> = routes
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"reverse"));
    assert!(names.contains(&"get_note"));
    assert!(names.contains(&"alexa_note"));
    // Internal routes stay hidden.
    assert!(!names.contains(&"catch_all"));

    for route in routes {
        assert!(route["rule"].as_str().unwrap().starts_with("/v0"));
        assert!(!route["doc"].as_str().unwrap().is_empty());
        assert!(!route["methods"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_reverse_hello() {
    let (status, json) = get_json("/v0/reverse/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reverse"], "olleh");
}

#[tokio::test]
async fn test_wav_note_c4() {
    let (status, content_type, body) =
        get("/v0/C4?format=wav&rate=44100&duration=1&octave=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));

    assert_eq!(wav_sample_rate(&body), 44_100);
    let samples = pcm_samples(&body);
    // ~1 second of mono PCM
    assert_eq!(samples.len(), 44_100);

    // A sine at 261.63 Hz crosses zero about 523 times per second.
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0) != (w[1] >= 0))
        .count();
    assert!((515..=530).contains(&crossings), "crossings = {}", crossings);
}

#[tokio::test]
async fn test_extension_suffix_is_stripped() {
    let (status_plain, _, plain) = get("/v0/C?duration=0.1").await;
    let (status_ext, _, ext) = get("/v0/C.wav?duration=0.1").await;
    assert_eq!(status_plain, StatusCode::OK);
    assert_eq!(status_ext, StatusCode::OK);
    assert_eq!(plain, ext);
}

#[tokio::test]
async fn test_octave_doubles_pitch() {
    let count = |body: &[u8]| {
        pcm_samples(body)
            .windows(2)
            .filter(|w| (w[0] >= 0) != (w[1] >= 0))
            .count() as f64
    };
    let (_, _, low) = get("/v0/A?octave=3&duration=1").await;
    let (_, _, high) = get("/v0/A?octave=4&duration=1").await;
    let ratio = count(&high) / count(&low);
    assert!((ratio - 2.0).abs() < 0.05, "ratio = {}", ratio);
}

#[tokio::test]
async fn test_sharp_plus_flat_cancels() {
    let (_, _, natural) = get("/v0/D?duration=0.1").await;
    let (_, _, both) = get("/v0/D?duration=0.1&sharp=1&flat=1").await;
    assert_eq!(natural, both);
}

#[tokio::test]
async fn test_opus_format() {
    let (status, content_type, body) = get("/v0/A?format=opus&duration=0.2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/ogg"));
    assert_eq!(&body[0..4], b"OggS");
}

#[tokio::test]
async fn test_mp3_format() {
    let (status, content_type, body) = get("/v0/A?format=mp3&duration=0.2&rate=16000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/mpeg"));
    // MPEG frame sync
    assert_eq!(body[0], 0xFF);
    assert_eq!(body[1] & 0xE0, 0xE0);
}

#[tokio::test]
async fn test_alexa_ignores_pipeline_params() {
    // Pipeline parameters are fixed for the Alexa endpoint; supplying
    // them must not change the output encoding.
    let (status, content_type, body) = get("/v0/alexa/A?format=wav&rate=44100&duration=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/mpeg"));
    assert!(!body.is_empty());
    assert_eq!(body[0], 0xFF);
    assert_eq!(body[1] & 0xE0, 0xE0);
}

#[tokio::test]
async fn test_note_response_disables_caching() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/v0/C?duration=0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    assert!(response.headers().get(header::ETAG).is_none());
}

#[tokio::test]
async fn test_unknown_letter_is_400() {
    let (status, json) = get_json("/v0/Z").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], 400);
    assert_eq!(json["error"]["name"], "Bad Request");
}

#[tokio::test]
async fn test_unparseable_rate_is_400() {
    let (status, json) = get_json("/v0/C?rate=fast").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], 400);
}

#[tokio::test]
async fn test_unknown_format_is_400() {
    let (status, json) = get_json("/v0/C?format=flac").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], 400);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, json) = get_json("/does/not/exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], 404);
    assert_eq!(json["error"]["name"], "Not Found");
    assert_eq!(
        json["error"]["description"],
        "Requested API call does not exist"
    );
}

#[tokio::test]
async fn test_unknown_route_post_is_404() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
