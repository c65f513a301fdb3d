//! State management module
//!
//! This module contains the countdown state machine, its derived values and
//! the coordinator that schedules it.

pub mod app_state;
pub mod floating_text;
pub mod phase;
pub mod progress;
pub mod task_title;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerSettings, TimerSnapshot, TimingConfig};
pub use floating_text::{FloatingText, GlyphFrame, Viewport};
pub use phase::Phase;
pub use task_title::TaskTitle;
pub use timer_state::{StartKind, TickOutcome, TimerState};
