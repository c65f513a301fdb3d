use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use focus_studio::{
    create_router,
    error::SessionApiError,
    services::{
        session_api::{
            CompleteSessionRequest, CompletionAck, SessionId, SessionTicket, StartSessionRequest,
        },
        BackgroundTrack, SessionTracker, SilentOutput, TimerTypeStats,
    },
    state::{floating_text::DEFAULT_PHRASE, AppState, FloatingText, TimerSettings, TimingConfig, Viewport},
};

#[derive(Default)]
struct StubTracker {
    starts: Mutex<Vec<StartSessionRequest>>,
}

#[async_trait]
impl SessionTracker for StubTracker {
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<SessionTicket, SessionApiError> {
        self.starts.lock().unwrap().push(request);
        Ok(SessionTicket {
            session_id: SessionId(json!(7)),
            started_at: None,
        })
    }

    async fn complete_session(
        &self,
        _request: CompleteSessionRequest,
    ) -> Result<CompletionAck, SessionApiError> {
        Ok(CompletionAck::default())
    }

    async fn fetch_stats(&self) -> Result<Vec<TimerTypeStats>, SessionApiError> {
        Ok(Vec::new())
    }
}

fn app(tracker: Arc<StubTracker>) -> (Arc<AppState>, Router) {
    let settings = TimerSettings {
        total_seconds: 5400,
        timer_type_id: 2,
        timing: TimingConfig::default(),
    };
    let text = FloatingText::layout(DEFAULT_PHRASE, Viewport::default(), &mut rand::thread_rng());
    let audio = BackgroundTrack::acquire(Box::new(SilentOutput), false);
    let state = Arc::new(AppState::new(settings, tracker, audio, text).unwrap());
    (Arc::clone(&state), create_router(state))
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn status_reports_idle_screen() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    let (status, body) = call(&router, Method::GET, "/timer/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["clock"], "90:00");
    assert_eq!(body["timer"]["progress"], 0.0);
    assert_eq!(body["timer"]["icon_opacity"], 0.3);
    assert_eq!(body["gathered"], false);
    assert_eq!(body["audio_playing"], false);
    assert_eq!(body["displayed_card"], Value::Null);
    state.shutdown();
}

#[tokio::test]
async fn start_pause_resume_round_trip() {
    let tracker = Arc::new(StubTracker::default());
    let (state, router) = app(tracker.clone());

    let (status, body) = call(&router, Method::POST, "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["remaining_seconds"], 5400);

    let (status, body) = call(&router, Method::POST, "/timer/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "paused");

    let (status, _) = call(&router, Method::POST, "/timer/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&router, Method::POST, "/timer/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "running");

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let starts = tracker.starts.lock().unwrap().clone();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].planned_duration_seconds, 5400);
    assert_eq!(starts[0].type_id, 2);
    state.shutdown();
}

#[tokio::test]
async fn complete_from_idle_is_a_conflict() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    let (status, body) = call(&router, Method::POST, "/timer/complete", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("idle"));
    state.shutdown();
}

#[tokio::test]
async fn early_completion_shows_gathered_text() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    call(&router, Method::POST, "/timer/start", None).await;
    let (status, body) = call(&router, Method::POST, "/timer/complete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completing");
    assert_eq!(body["timer"]["eased_progress"], 1.0);

    let (status, body) = call(&router, Method::GET, "/timer/text", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gathered"], true);
    assert_eq!(body["phrase"], DEFAULT_PHRASE);
    assert_eq!(
        body["glyphs"].as_array().unwrap().len(),
        DEFAULT_PHRASE.chars().count()
    );
    state.shutdown();
}

#[tokio::test]
async fn scan_flow_shows_and_dismisses_card() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    let (status, _) = call(&router, Method::POST, "/scan", Some(json!({ "payload": "hello" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &router,
        Method::POST,
        "/scan/open",
        Some(json!({ "camera_available": false, "reason": "permission denied" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["open"], true);
    assert_eq!(body["mode"], "upload");

    let (status, body) = call(
        &router,
        Method::POST,
        "/scan",
        Some(json!({ "payload": "https://studio.example/?card=2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["action"], "show_card");
    assert_eq!(body["outcome"]["value"], 2);
    assert_eq!(body["displayed_card"], 2);

    let (status, body) = call(&router, Method::DELETE, "/card", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dismissed"], 2);

    let (status, _) = call(&router, Method::DELETE, "/card", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    state.shutdown();
}

#[tokio::test]
async fn task_title_can_be_renamed() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    let (_, body) = call(&router, Method::GET, "/timer/status", None).await;
    assert_eq!(body["task_title"], "放松身心，享受片刻宁静");

    let (status, body) = call(&router, Method::PUT, "/timer/title", Some(json!({ "title": "  晨间写作  " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task_title"], "晨间写作");

    let (status, body) = call(&router, Method::PUT, "/timer/title", Some(json!({ "title": " " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let (status, _) = call(
        &router,
        Method::PUT,
        "/timer/title",
        Some(json!({ "title": "一二三四五六七八九十一二三四五六" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = call(&router, Method::GET, "/timer/status", None).await;
    assert_eq!(body["task_title"], "晨间写作");
    state.shutdown();
}

#[tokio::test]
async fn external_links_are_passed_through() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    call(&router, Method::POST, "/scan/open", Some(json!({}))).await;
    let (_, body) = call(
        &router,
        Method::POST,
        "/scan",
        Some(json!({ "payload": "https://example.com/?card=9" })),
    )
    .await;
    assert_eq!(body["outcome"]["action"], "open_link");
    assert_eq!(body["outcome"]["value"], "https://example.com/?card=9");
    assert_eq!(body["displayed_card"], Value::Null);
    state.shutdown();
}

#[tokio::test]
async fn stats_and_health_respond_without_backend() {
    let (state, router) = app(Arc::new(StubTracker::default()));

    let (status, body) = call(&router, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["summary"]["total_sessions"], 0);

    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&router, Method::POST, "/audio/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playing"], false);
    state.shutdown();
}
