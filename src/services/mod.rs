//! External collaborators
//!
//! This module wraps everything the coordinator talks to but does not own:
//! the session backend, the audio player and the QR scanning client.

pub mod audio;
pub mod notifier;
pub mod scan;
pub mod session_api;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use audio::{AudioOutput, BackgroundTrack, ProcessOutput, SilentOutput};
pub use notifier::SessionNotifier;
pub use scan::{classify_scan, CardId, ScanMode, ScanOutcome, ScanSession};
pub use session_api::{HttpSessionTracker, SessionId, SessionTracker};
pub use stats::{StatsSummary, TimerTypeStats};
