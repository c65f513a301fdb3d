//! Countdown state machine
//!
//! Pure transitions only. Scheduling (ticks, frames, completion delays) lives
//! in `tasks` and is driven by `AppState`, which applies these transitions
//! under its lock.

use std::time::Duration;
use tokio::time::Instant;

use crate::error::TimerError;
use super::Phase;

/// What a `start` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartKind {
    /// A fresh session began from Idle or Completed
    NewSession,
    /// Paused session continued
    Resumed,
    /// Already running, nothing changed
    AlreadyRunning,
}

/// Result of applying one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale tick (not running, or scheduled under an older epoch)
    Ignored,
    Counted { remaining: u64 },
    /// Countdown hit zero and the timer entered Completing
    Finished { elapsed: Duration },
}

/// Countdown state for one timer screen
#[derive(Debug, Clone)]
pub struct TimerState {
    total_seconds: u64,
    remaining_seconds: u64,
    phase: Phase,
    completed_count: u64,
    /// Bumped on every entry into Running
    epoch: u64,
    /// Active wall-clock time banked from earlier running spans
    active_elapsed: Duration,
    running_since: Option<Instant>,
}

impl TimerState {
    /// Create an idle timer with the full duration remaining
    pub fn new(total_seconds: u64) -> Result<Self, TimerError> {
        if total_seconds == 0 {
            return Err(TimerError::ZeroDuration);
        }

        Ok(Self {
            total_seconds,
            remaining_seconds: total_seconds,
            phase: Phase::Idle,
            completed_count: 0,
            epoch: 0,
            active_elapsed: Duration::ZERO,
            running_since: None,
        })
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Active wall-clock time of the current session, paused spans excluded
    pub fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or(Duration::ZERO);
        self.active_elapsed + running
    }

    pub fn start(&mut self, now: Instant) -> Result<StartKind, TimerError> {
        match self.phase {
            Phase::Running => Ok(StartKind::AlreadyRunning),
            Phase::Paused => {
                self.enter_running(now);
                Ok(StartKind::Resumed)
            }
            Phase::Idle | Phase::Completed => {
                self.remaining_seconds = self.total_seconds;
                self.active_elapsed = Duration::ZERO;
                self.enter_running(now);
                Ok(StartKind::NewSession)
            }
            Phase::Completing => Err(self.invalid("start")),
        }
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.phase != Phase::Running {
            return Err(self.invalid("pause"));
        }
        self.bank_clock(now);
        self.phase = Phase::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.phase != Phase::Paused {
            return Err(self.invalid("resume"));
        }
        self.enter_running(now);
        Ok(())
    }

    /// Apply a tick scheduled under `epoch`
    pub fn tick(&mut self, epoch: u64, now: Instant) -> TickOutcome {
        if self.phase != Phase::Running || epoch != self.epoch {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            TickOutcome::Finished {
                elapsed: self.enter_completing(now),
            }
        } else {
            TickOutcome::Counted {
                remaining: self.remaining_seconds,
            }
        }
    }

    /// Early completion requested by the user; returns the elapsed active time
    pub fn complete(&mut self, now: Instant) -> Result<Duration, TimerError> {
        match self.phase {
            Phase::Running | Phase::Paused => Ok(self.enter_completing(now)),
            _ => Err(self.invalid("complete")),
        }
    }

    /// End of the completion window: count the session and show the closing display
    pub fn finish_completion(&mut self) -> Result<(), TimerError> {
        if self.phase != Phase::Completing {
            return Err(self.invalid("finish completion"));
        }
        self.completed_count += 1;
        self.remaining_seconds = self.total_seconds;
        self.active_elapsed = Duration::ZERO;
        self.phase = Phase::Completed;
        Ok(())
    }

    /// Leave the closing display. Returns false when not in Completed.
    pub fn settle(&mut self) -> bool {
        if self.phase != Phase::Completed {
            return false;
        }
        self.phase = Phase::Idle;
        true
    }

    /// Manual reset to Idle; never counts as a completion
    pub fn reset(&mut self) -> Result<(), TimerError> {
        if self.phase == Phase::Completing {
            return Err(self.invalid("reset"));
        }
        self.remaining_seconds = self.total_seconds;
        self.active_elapsed = Duration::ZERO;
        self.running_since = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    fn enter_running(&mut self, now: Instant) {
        self.epoch += 1;
        self.running_since = Some(now);
        self.phase = Phase::Running;
    }

    fn enter_completing(&mut self, now: Instant) -> Duration {
        self.bank_clock(now);
        self.phase = Phase::Completing;
        self.active_elapsed
    }

    fn bank_clock(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.active_elapsed += now.saturating_duration_since(since);
        }
    }

    fn invalid(&self, action: &'static str) -> TimerError {
        TimerError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }
}
