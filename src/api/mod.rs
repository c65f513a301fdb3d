//! HTTP API module
//!
//! Local control surface for the screen: timer transitions, the floating
//! phrase, the background track, scanning and stats.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/resume", post(resume_handler))
        .route("/timer/complete", post(complete_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/status", get(status_handler))
        .route("/timer/text", get(text_handler))
        .route("/timer/title", put(title_handler))
        .route("/audio/toggle", post(audio_toggle_handler))
        .route("/scan/open", post(scan_open_handler))
        .route("/scan", post(scan_handler))
        .route("/card", delete(dismiss_card_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
