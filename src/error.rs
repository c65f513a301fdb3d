//! Error types shared across the coordinator, its services and the HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::state::Phase;

/// Rejected timer transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    #[error("timer duration must be greater than zero")]
    ZeroDuration,

    #[error("timer duration of {minutes} minutes is too long")]
    DurationTooLong { minutes: u64 },

    #[error("timer state lock poisoned")]
    Poisoned,
}

/// Failures talking to the session backend
#[derive(Debug, Error)]
pub enum SessionApiError {
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("response carried no data")]
    EmptyResponse,

    #[error("no user id configured")]
    MissingUser,
}

/// Audio acquisition and playback failures
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("playback rejected: {0}")]
    Rejected(String),

    #[error("audio output already released")]
    Released,
}

/// Scan session misuse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("no scanning session is open")]
    SessionClosed,
}

/// Rejected task title edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("task title cannot be empty")]
    Empty,

    #[error("task title is {len} characters, at most {max} allowed")]
    TooLong { len: usize, max: usize },
}

/// Error returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Title(#[from] TitleError),

    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Timer(TimerError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            ApiError::Timer(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Scan(ScanError::SessionClosed) => StatusCode::CONFLICT,
            ApiError::Scan(ScanError::CameraUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Title(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
