//! Completion transition task

use std::sync::Arc;
use tokio::time::sleep;

use crate::state::AppState;

/// Walk a finished session through Completing → Completed → Idle.
///
/// This is the only path out of Completing, which keeps the completed
/// display on screen for the whole hold before the reset.
pub async fn completion_task(state: Arc<AppState>, epoch: u64) {
    let timing = state.timing();

    sleep(timing.completion_delay).await;
    state.finish_completion(epoch);

    sleep(timing.completed_hold).await;
    state.settle(epoch);
}
