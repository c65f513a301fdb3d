//! One-second countdown task

use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::state::{AppState, TickOutcome};

/// Tick the countdown for one running span.
///
/// Spawned on every entry into Running and aborted on any exit, so a tick
/// only reaches the state machine while the span is live. Ticks that still
/// race a transition are rejected by the epoch check.
pub async fn countdown_task(state: Arc<AppState>, epoch: u64) {
    let period = state.timing().tick_interval;
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("Countdown started for epoch {}", epoch);

    loop {
        interval.tick().await;

        match state.apply_tick(epoch) {
            TickOutcome::Counted { .. } => continue,
            TickOutcome::Finished { .. } => break,
            TickOutcome::Ignored => {
                debug!("Countdown for epoch {} is stale, stopping", epoch);
                break;
            }
        }
    }
}
