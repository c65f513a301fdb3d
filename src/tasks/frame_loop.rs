//! Animation frame loop for the floating phrase

use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::state::AppState;

/// Advance the animation frame counter while the timer is running
pub async fn frame_loop_task(state: Arc<AppState>, epoch: u64) {
    let mut frames = interval(state.timing().frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        frames.tick().await;
        if !state.advance_frame(epoch) {
            debug!("Frame loop for epoch {} finished", epoch);
            break;
        }
    }
}
