//! In-memory `SessionTracker` used by unit tests

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::json;

use crate::error::SessionApiError;
use super::{
    session_api::{
        CompleteSessionRequest, CompletionAck, SessionId, SessionTicket, SessionTracker,
        StartSessionRequest,
    },
    stats::TimerTypeStats,
};

#[derive(Default)]
pub struct RecordingTracker {
    starts: Mutex<Vec<StartSessionRequest>>,
    completions: Mutex<Vec<CompleteSessionRequest>>,
    stats_calls: AtomicU64,
    next_id: AtomicU64,
    fail: bool,
}

impl RecordingTracker {
    /// Tracker whose every call fails as if the backend were down
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn starts(&self) -> Vec<StartSessionRequest> {
        self.starts.lock().unwrap().clone()
    }

    pub fn completions(&self) -> Vec<CompleteSessionRequest> {
        self.completions.lock().unwrap().clone()
    }

    pub fn stats_calls(&self) -> u64 {
        self.stats_calls.load(Ordering::SeqCst)
    }

    fn outage(&self) -> Result<(), SessionApiError> {
        if self.fail {
            Err(SessionApiError::Status {
                status: 503,
                body: "backend unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionTracker for RecordingTracker {
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<SessionTicket, SessionApiError> {
        self.starts.lock().unwrap().push(request);
        self.outage()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SessionTicket {
            session_id: SessionId(json!(format!("session-{}", id))),
            started_at: None,
        })
    }

    async fn complete_session(
        &self,
        request: CompleteSessionRequest,
    ) -> Result<CompletionAck, SessionApiError> {
        self.completions.lock().unwrap().push(request);
        self.outage()?;
        Ok(CompletionAck::default())
    }

    async fn fetch_stats(&self) -> Result<Vec<TimerTypeStats>, SessionApiError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.outage()?;
        Ok(Vec::new())
    }
}
