//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::{CardId, ScanMode, ScanOutcome, StatsSummary, TimerTypeStats},
    state::{floating_text::is_gathered, GlyphFrame, Phase, TaskTitle, TimerSnapshot},
};

/// Response for the timer transition endpoints
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl TimerResponse {
    pub fn new(message: impl Into<String>, snapshot: &TimerSnapshot) -> Self {
        Self {
            status: snapshot.phase.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer: TimerView::from(snapshot),
        }
    }
}

/// Countdown fields plus the values derived from them
#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub completed_count: u64,
    pub clock: String,
    pub progress: f64,
    pub eased_progress: f64,
    pub icon_opacity: f64,
}

impl From<&TimerSnapshot> for TimerView {
    fn from(snapshot: &TimerSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            remaining_seconds: snapshot.remaining_seconds,
            total_seconds: snapshot.total_seconds,
            completed_count: snapshot.completed_count,
            clock: snapshot.clock(),
            progress: snapshot.progress(),
            eased_progress: snapshot.eased_progress(),
            icon_opacity: snapshot.icon_opacity(),
        }
    }
}

/// Full status of the screen
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub task_title: TaskTitle,
    pub animation_frame: u64,
    pub gathered: bool,
    pub audio_playing: bool,
    pub displayed_card: Option<CardId>,
    pub scan_open: bool,
    pub session_open: bool,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Floating phrase for the current frame
#[derive(Debug, Clone, Serialize)]
pub struct TextResponse {
    pub phrase: String,
    pub eased_progress: f64,
    pub gathered: bool,
    pub glyphs: Vec<GlyphFrame>,
}

impl TextResponse {
    pub fn new(phrase: &str, snapshot: &TimerSnapshot, glyphs: Vec<GlyphFrame>) -> Self {
        let eased_progress = snapshot.eased_progress();
        Self {
            phrase: phrase.to_string(),
            eased_progress,
            gathered: is_gathered(eased_progress),
            glyphs,
        }
    }
}

/// Body of PUT /timer/title
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub task_title: TaskTitle,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioResponse {
    pub playing: bool,
}

/// Body of POST /scan/open
#[derive(Debug, Clone, Deserialize)]
pub struct OpenScanRequest {
    #[serde(default = "camera_default")]
    pub camera_available: bool,
    pub reason: Option<String>,
}

fn camera_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSessionResponse {
    pub open: bool,
    pub mode: ScanMode,
}

/// Body of POST /scan
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub payload: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub outcome: ScanOutcome,
    pub displayed_card: Option<CardId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardResponse {
    pub dismissed: CardId,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub available: bool,
    pub stats: Vec<TimerTypeStats>,
    pub summary: StatsSummary,
}

impl StatsResponse {
    pub fn new(stats: Option<Vec<TimerTypeStats>>) -> Self {
        let available = stats.is_some();
        let stats = stats.unwrap_or_default();
        let summary = StatsSummary::from_stats(&stats);
        Self { available, stats, summary }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
