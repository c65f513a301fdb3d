//! Derived animation values
//!
//! Everything here is a pure function of the current timer snapshot. Callers
//! recompute on every state change instead of caching across phases.

use super::Phase;

/// Minimum icon opacity before any progress has been made
const ICON_BASE_OPACITY: f64 = 0.3;

/// Raw gathering progress in [0, 1]
pub fn gathering_progress(remaining: u64, total: u64, phase: Phase) -> f64 {
    if phase.is_completion() {
        return 1.0;
    }
    countdown_fraction(remaining, total)
}

/// Cubic ease-in-out
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Gathering progress fed through the easing curve
pub fn eased_gathering_progress(remaining: u64, total: u64, phase: Phase) -> f64 {
    ease_in_out_cubic(gathering_progress(remaining, total, phase))
}

/// Timer icon fades in linearly from 30% as the countdown advances.
///
/// Only the completed display pins it to full opacity; while completing it
/// still follows the countdown.
pub fn icon_opacity(remaining: u64, total: u64, phase: Phase) -> f64 {
    if phase == Phase::Completed {
        return 1.0;
    }
    ICON_BASE_OPACITY + countdown_fraction(remaining, total) * (1.0 - ICON_BASE_OPACITY)
}

fn countdown_fraction(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let done = total.saturating_sub(remaining) as f64;
    (done / total as f64).clamp(0.0, 1.0)
}
