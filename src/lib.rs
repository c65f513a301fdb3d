//! Focus Studio - A focus timer coordinator
//!
//! This library drives a countdown session: the timer state machine, the
//! gathering animation derived from it, session start/complete notifications
//! to the tracking backend, QR scan dispatch and a background track.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, SessionApiError, TimerError};
pub use state::{AppState, Phase, TimerSnapshot};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
