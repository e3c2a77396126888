//! HTTP Error Handling
//!
//! Uniform JSON error envelope: `{"error": {"code", "name", "response"?,
//! "description"?}}`, returned with the matching HTTP status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ports::{SynthesisError, TranscodeError};
use crate::domain::NoteError;

/// Serialized error detail
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: u16,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorInfo,
}

/// API error
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn description(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let description = self.description().to_string();

        match &self {
            ApiError::Internal(msg) => {
                tracing::error!(code = status.as_u16(), error = %msg, "Internal server error");
            }
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => {
                tracing::warn!(code = status.as_u16(), error = %msg, "Client error");
            }
        }

        let envelope = ErrorEnvelope {
            error: ErrorInfo {
                code: status.as_u16(),
                name: status.canonical_reason().unwrap_or("Unknown").to_string(),
                response: None,
                description: Some(description),
            },
        };

        (status, Json(envelope)).into_response()
    }
}

impl From<NoteError> for ApiError {
    fn from(e: NoteError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<SynthesisError> for ApiError {
    fn from(e: SynthesisError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<TranscodeError> for ApiError {
    fn from(e: TranscodeError) -> Self {
        match e {
            TranscodeError::UnsupportedFormat(_) | TranscodeError::InvalidOption(_) => {
                ApiError::BadRequest(e.to_string())
            }
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope {
            error: ErrorInfo {
                code: 404,
                name: "Not Found".to_string(),
                response: None,
                description: Some("Requested API call does not exist".to_string()),
            },
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["error"]["code"], 404);
        assert_eq!(json["error"]["name"], "Not Found");
        assert!(json["error"].get("response").is_none());
    }

    #[test]
    fn test_transcode_error_mapping() {
        let bad: ApiError = TranscodeError::UnsupportedFormat("flac".into()).into();
        assert!(matches!(bad, ApiError::BadRequest(_)));

        let internal: ApiError = TranscodeError::EncodingError("boom".into()).into();
        assert!(matches!(internal, ApiError::Internal(_)));
    }
}
