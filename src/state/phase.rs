//! Countdown phases

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete state of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    /// Transient window between the completion trigger and the completed display
    Completing,
    /// Closing display; returns to Idle after the hold delay
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Completing => "completing",
            Phase::Completed => "completed",
        }
    }

    /// Gathering progress is pinned to 1 in these phases
    pub fn is_completion(&self) -> bool {
        matches!(self, Phase::Completing | Phase::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}
