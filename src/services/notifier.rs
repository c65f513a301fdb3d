//! Best-effort session notifications
//!
//! Start and complete calls are spawned and never awaited by the timer. The
//! pending-session slot doubles as the de-duplication key: a session is
//! started at most once and completed at most once.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session_api::{CompleteSessionRequest, SessionId, SessionTracker, StartSessionRequest};

type PendingSession = JoinHandle<Option<SessionId>>;

pub struct SessionNotifier {
    tracker: Arc<dyn SessionTracker>,
    timer_type_id: i64,
    pending: Mutex<Option<PendingSession>>,
}

impl SessionNotifier {
    pub fn new(tracker: Arc<dyn SessionTracker>, timer_type_id: i64) -> Self {
        Self {
            tracker,
            timer_type_id,
            pending: Mutex::new(None),
        }
    }

    pub fn tracker(&self) -> Arc<dyn SessionTracker> {
        Arc::clone(&self.tracker)
    }

    /// Whether a session start has been issued and not yet completed or abandoned
    pub fn has_session(&self) -> bool {
        self.slot().is_some()
    }

    /// Issue a session start unless one is already open. Returns whether a call was made.
    pub fn session_started(&self, planned_seconds: u64) -> bool {
        let mut slot = self.slot();
        if slot.is_some() {
            debug!("Session already open, skipping duplicate start");
            return false;
        }

        let tracker = Arc::clone(&self.tracker);
        let request = StartSessionRequest {
            type_id: self.timer_type_id,
            planned_duration_seconds: planned_seconds,
        };

        *slot = Some(tokio::spawn(async move {
            match tracker.start_session(request).await {
                Ok(ticket) => {
                    info!("Session {} started", ticket.session_id);
                    Some(ticket.session_id)
                }
                Err(e) => {
                    warn!("Failed to start session: {}", e);
                    None
                }
            }
        }));
        true
    }

    /// Report the open session as completed after `elapsed` of active time.
    ///
    /// Waits for an in-flight start to resolve first so the completion always
    /// refers to the id the backend handed out.
    pub fn session_completed(&self, elapsed: Duration) -> Option<JoinHandle<()>> {
        let Some(pending) = self.slot().take() else {
            debug!("No open session to complete");
            return None;
        };

        let tracker = Arc::clone(&self.tracker);
        let actual_duration_seconds = elapsed.as_secs_f64().round() as u64;

        Some(tokio::spawn(async move {
            let session_id = match pending.await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    warn!("Session never opened on the backend, skipping completion");
                    return;
                }
                Err(e) => {
                    warn!("Session start task failed: {}", e);
                    return;
                }
            };

            let request = CompleteSessionRequest {
                session_id: session_id.clone(),
                actual_duration_seconds,
            };
            match tracker.complete_session(request).await {
                Ok(_) => info!(
                    "Session {} completed after {}s",
                    session_id, actual_duration_seconds
                ),
                Err(e) => warn!("Failed to complete session {}: {}", session_id, e),
            }
        }))
    }

    /// Forget the open session without telling the backend
    pub fn abandon(&self) {
        if self.slot().take().is_some() {
            debug!("Abandoned open session");
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<PendingSession>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
