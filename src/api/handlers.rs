//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ScanError},
    state::AppState,
};
use super::responses::{
    AudioResponse, CardResponse, HealthResponse, OpenScanRequest, ScanRequest, ScanResponse,
    ScanSessionResponse, StatsResponse, StatusResponse, TextResponse, TimerResponse, TimerView,
    TitleRequest, TitleResponse,
};

/// Handle POST /timer/start - Start a session, or continue a paused one
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state.start()?;
    info!("Start endpoint called");
    Ok(Json(TimerResponse::new("Timer started", &snapshot)))
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state.pause()?;
    info!("Pause endpoint called");
    Ok(Json(TimerResponse::new("Timer paused", &snapshot)))
}

/// Handle POST /timer/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state.resume()?;
    info!("Resume endpoint called");
    Ok(Json(TimerResponse::new("Timer resumed", &snapshot)))
}

/// Handle POST /timer/complete - Finish the session early
pub async fn complete_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state.complete()?;
    info!("Complete endpoint called");
    Ok(Json(TimerResponse::new("Session completed", &snapshot)))
}

/// Handle POST /timer/reset - Drop the session without counting it
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state.reset()?;
    info!("Reset endpoint called");
    Ok(Json(TimerResponse::new("Timer reset", &snapshot)))
}

/// Handle GET /timer/status - Return the full screen status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let snapshot = state.snapshot()?;
    let (last_action, last_action_time) = state.get_last_action();
    let timer = TimerView::from(&snapshot);

    Ok(Json(StatusResponse {
        gathered: crate::state::floating_text::is_gathered(timer.eased_progress),
        timer,
        task_title: state.task_title(),
        animation_frame: state.animation_frame(),
        audio_playing: state.audio_playing(),
        displayed_card: state.displayed_card(),
        scan_open: state.scan_open(),
        session_open: state.has_open_session(),
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /timer/text - Floating phrase positions for the current frame
pub async fn text_handler(State(state): State<Arc<AppState>>) -> Result<Json<TextResponse>, ApiError> {
    let (snapshot, glyphs) = state.floating_frame()?;
    Ok(Json(TextResponse::new(state.floating_text().phrase(), &snapshot, glyphs)))
}

/// Handle PUT /timer/title - Rename the current task
pub async fn title_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TitleRequest>,
) -> Result<Json<TitleResponse>, ApiError> {
    let task_title = state.set_task_title(&request.title)?;
    Ok(Json(TitleResponse { task_title }))
}

/// Handle POST /audio/toggle
pub async fn audio_toggle_handler(State(state): State<Arc<AppState>>) -> Json<AudioResponse> {
    Json(AudioResponse { playing: state.toggle_audio() })
}

/// Handle POST /scan/open - Open a scanning dialog
pub async fn scan_open_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenScanRequest>,
) -> Json<ScanSessionResponse> {
    let camera = if request.camera_available {
        Ok(())
    } else {
        let reason = request.reason.unwrap_or_else(|| "camera not available".to_string());
        warn!("Camera unavailable: {}", reason);
        Err(ScanError::CameraUnavailable(reason))
    };

    let session = state.open_scan(camera);
    Json(ScanSessionResponse {
        open: session.is_open(),
        mode: session.mode(),
    })
}

/// Handle POST /scan - Dispatch a decoded payload
pub async fn scan_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let outcome = state.submit_scan(&request.payload)?;
    Ok(Json(ScanResponse {
        outcome,
        displayed_card: state.displayed_card(),
    }))
}

/// Handle DELETE /card - Dismiss the displayed card
pub async fn dismiss_card_handler(State(state): State<Arc<AppState>>) -> Result<Json<CardResponse>, ApiError> {
    let dismissed = state
        .dismiss_card()
        .ok_or_else(|| ApiError::NotFound("no card displayed".to_string()))?;
    info!("Card {} dismissed", dismissed);
    Ok(Json(CardResponse { dismissed }))
}

/// Handle GET /stats - Latest usage statistics
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.latest_stats()))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
