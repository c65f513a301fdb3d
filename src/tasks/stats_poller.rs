//! Periodic stats refresh

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::services::{
    session_api::SessionTracker,
    stats::{changed_types, StatsSummary, TimerTypeStats},
};

/// Latest stats report, `None` until the first successful fetch
pub type StatsReport = Option<Vec<TimerTypeStats>>;

/// A running stats refresh. Dropping it stops the refresh.
pub struct StatsSubscription {
    handle: JoinHandle<()>,
    latest: watch::Receiver<StatsReport>,
}

impl StatsSubscription {
    /// Fetch immediately, then every `every`
    pub fn spawn(tracker: Arc<dyn SessionTracker>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(stats_poll_task(tracker, every, tx));
        Self { handle, latest: rx }
    }

    pub fn latest(&self) -> StatsReport {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatsReport> {
        self.latest.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop refreshing
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for StatsSubscription {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("Stats subscription stopped");
    }
}

async fn stats_poll_task(
    tracker: Arc<dyn SessionTracker>,
    every: Duration,
    tx: watch::Sender<StatsReport>,
) {
    info!("Starting stats refresh every {}s", every.as_secs());

    let mut ticks = interval(every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;

        match tracker.fetch_stats().await {
            Ok(stats) => {
                let previous = tx.borrow().clone().unwrap_or_default();
                let changed = changed_types(&previous, &stats);
                if !changed.is_empty() {
                    info!("Stats updated for: {}", changed.join(", "));
                }

                let summary = StatsSummary::from_stats(&stats);
                debug!(
                    "Stats: {} sessions, {} completed, {}s total, {}% completion",
                    summary.total_sessions,
                    summary.total_completed,
                    summary.total_duration,
                    summary.completion_rate
                );
                tx.send_replace(Some(stats));
            }
            Err(e) => warn!("Failed to refresh stats: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::RecordingTracker;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_interval_until_stopped() {
        let tracker = Arc::new(RecordingTracker::default());
        let subscription = StatsSubscription::spawn(tracker.clone(), Duration::from_secs(30));

        sleep(Duration::from_secs(65)).await;
        assert_eq!(tracker.stats_calls(), 3);
        assert_eq!(subscription.latest(), Some(Vec::new()));

        subscription.stop();
        sleep(Duration::from_secs(120)).await;
        assert_eq!(tracker.stats_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_keep_last_report_empty() {
        let tracker = Arc::new(RecordingTracker::failing());
        let subscription = StatsSubscription::spawn(tracker.clone(), Duration::from_secs(30));

        sleep(Duration::from_secs(31)).await;
        assert_eq!(tracker.stats_calls(), 2);
        assert_eq!(subscription.latest(), None);
        assert!(subscription.is_running());
    }
}
