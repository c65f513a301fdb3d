//! Focus timer coordinator
//!
//! `AppState` owns the countdown and every resource whose lifetime follows it:
//! the tick and frame tasks, the completion task, the session notifier, the
//! background track and the stats subscription. All transitions run under the
//! timer lock, and task handles are swapped in the same critical section, so
//! a transition and its task bookkeeping are never observed half done.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ScanError, TimerError, TitleError},
    services::{BackgroundTrack, CardId, ScanOutcome, ScanSession, SessionNotifier, SessionTracker},
    tasks::{completion_task, countdown_task, frame_loop_task, StatsReport, StatsSubscription},
    utils::format_clock,
};
use super::{
    floating_text::{FloatingText, GlyphFrame},
    progress::{eased_gathering_progress, gathering_progress, icon_opacity},
    task_title::TaskTitle,
    Phase, StartKind, TickOutcome, TimerState,
};

/// Scheduling constants for one coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_interval: Duration,
    pub frame_interval: Duration,
    /// Completing → Completed
    pub completion_delay: Duration,
    /// Completed → Idle
    pub completed_hold: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            frame_interval: Duration::from_millis(16),
            completion_delay: Duration::from_millis(800),
            completed_hold: Duration::from_secs(2),
        }
    }
}

/// Everything the coordinator needs besides its collaborators
#[derive(Debug, Clone)]
pub struct TimerSettings {
    pub total_seconds: u64,
    pub timer_type_id: i64,
    pub timing: TimingConfig,
}

/// Point-in-time view of the countdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub completed_count: u64,
}

impl TimerSnapshot {
    fn of(timer: &TimerState) -> Self {
        Self {
            phase: timer.phase(),
            remaining_seconds: timer.remaining_seconds(),
            total_seconds: timer.total_seconds(),
            completed_count: timer.completed_count(),
        }
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    pub fn progress(&self) -> f64 {
        gathering_progress(self.remaining_seconds, self.total_seconds, self.phase)
    }

    pub fn eased_progress(&self) -> f64 {
        eased_gathering_progress(self.remaining_seconds, self.total_seconds, self.phase)
    }

    pub fn icon_opacity(&self) -> f64 {
        icon_opacity(self.remaining_seconds, self.total_seconds, self.phase)
    }
}

/// Handles of the tasks that belong to the current phase
#[derive(Default)]
struct TaskSlots {
    countdown: Option<JoinHandle<()>>,
    frames: Option<JoinHandle<()>>,
    completion: Option<JoinHandle<()>>,
}

impl TaskSlots {
    fn stop_running(&mut self) {
        for handle in [self.countdown.take(), self.frames.take()].into_iter().flatten() {
            handle.abort();
        }
    }

    fn cancel_completion(&mut self) {
        if let Some(handle) = self.completion.take() {
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        self.stop_running();
        self.cancel_completion();
    }
}

pub struct AppState {
    timer: Mutex<TimerState>,
    tasks: Mutex<TaskSlots>,
    timing: TimingConfig,
    notifier: SessionNotifier,
    audio: Mutex<BackgroundTrack>,
    scan: Mutex<ScanSession>,
    displayed_card: Mutex<Option<CardId>>,
    stats: Mutex<Option<StatsSubscription>>,
    floating_text: FloatingText,
    task_title: Mutex<TaskTitle>,
    animation_frame: AtomicU64,
    /// Latest snapshot, for pollers
    snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Every state change, for observers that need the full sequence
    events_tx: broadcast::Sender<TimerSnapshot>,
    /// Server metadata
    pub start_time: std::time::Instant,
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        settings: TimerSettings,
        tracker: Arc<dyn SessionTracker>,
        audio: BackgroundTrack,
        floating_text: FloatingText,
    ) -> Result<Self, TimerError> {
        let timer = TimerState::new(settings.total_seconds)?;
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::of(&timer));
        let (events_tx, _) = broadcast::channel(100);

        Ok(Self {
            timer: Mutex::new(timer),
            tasks: Mutex::new(TaskSlots::default()),
            timing: settings.timing,
            notifier: SessionNotifier::new(tracker, settings.timer_type_id),
            audio: Mutex::new(audio),
            scan: Mutex::new(ScanSession::closed()),
            displayed_card: Mutex::new(None),
            stats: Mutex::new(None),
            floating_text,
            task_title: Mutex::new(TaskTitle::default()),
            animation_frame: AtomicU64::new(0),
            snapshot_tx,
            events_tx,
            start_time: std::time::Instant::now(),
            last_action: Mutex::new(None),
        })
    }

    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        Ok(TimerSnapshot::of(&*self.lock_timer()?))
    }

    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerSnapshot> {
        self.events_tx.subscribe()
    }

    pub fn has_open_session(&self) -> bool {
        self.notifier.has_session()
    }

    /// Start a new session, or continue a paused one
    pub fn start(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        let mut timer = self.lock_timer()?;
        let kind = timer.start(Instant::now())?;

        if kind == StartKind::AlreadyRunning {
            debug!("Timer already running, ignoring start");
            return Ok(TimerSnapshot::of(&timer));
        }

        let mut tasks = self.lock_tasks();
        tasks.cancel_completion();
        self.spawn_running(&mut tasks, timer.epoch());

        if kind == StartKind::NewSession {
            info!("Starting {}s session", timer.remaining_seconds());
            self.notifier.session_started(timer.remaining_seconds());
        } else {
            info!("Continuing paused session at {}", format_clock(timer.remaining_seconds()));
        }

        self.record_action("start");
        Ok(self.publish(&timer))
    }

    pub fn pause(&self) -> Result<TimerSnapshot, TimerError> {
        let mut timer = self.lock_timer()?;
        timer.pause(Instant::now())?;
        self.lock_tasks().stop_running();

        info!("Paused at {}", format_clock(timer.remaining_seconds()));
        self.record_action("pause");
        Ok(self.publish(&timer))
    }

    pub fn resume(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        let mut timer = self.lock_timer()?;
        timer.resume(Instant::now())?;
        self.spawn_running(&mut self.lock_tasks(), timer.epoch());

        info!("Resumed at {}", format_clock(timer.remaining_seconds()));
        self.record_action("resume");
        Ok(self.publish(&timer))
    }

    /// Finish the session early
    pub fn complete(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        let mut timer = self.lock_timer()?;
        let elapsed = timer.complete(Instant::now())?;

        info!("Session completed by user after {}s", elapsed.as_secs());
        self.enter_completing(&timer, elapsed);
        self.record_action("complete");
        Ok(self.publish(&timer))
    }

    /// Manual reset to Idle; the session is dropped and not counted
    pub fn reset(&self) -> Result<TimerSnapshot, TimerError> {
        let mut timer = self.lock_timer()?;
        timer.reset()?;
        self.lock_tasks().abort_all();
        self.notifier.abandon();

        info!("Timer reset");
        self.record_action("reset");
        Ok(self.publish(&timer))
    }

    /// Apply one countdown tick scheduled under `epoch`
    pub fn apply_tick(self: &Arc<Self>, epoch: u64) -> TickOutcome {
        let Ok(mut timer) = self.lock_timer() else {
            warn!("Timer lock poisoned, dropping tick");
            return TickOutcome::Ignored;
        };

        let outcome = timer.tick(epoch, Instant::now());
        match outcome {
            TickOutcome::Ignored => debug!("Ignoring stale tick for epoch {}", epoch),
            TickOutcome::Counted { .. } => {
                self.publish(&timer);
            }
            TickOutcome::Finished { elapsed } => {
                info!("Countdown finished after {}s", elapsed.as_secs());
                self.enter_completing(&timer, elapsed);
                self.publish(&timer);
            }
        }
        outcome
    }

    /// Completing → Completed, counting the session
    pub fn finish_completion(&self, epoch: u64) {
        let Ok(mut timer) = self.lock_timer() else {
            warn!("Timer lock poisoned, cannot finish completion");
            return;
        };
        if timer.epoch() != epoch {
            debug!("Completion for epoch {} superseded", epoch);
            return;
        }

        match timer.finish_completion() {
            Ok(()) => {
                info!("Session #{} completed", timer.completed_count());
                self.publish(&timer);
            }
            Err(e) => debug!("Skipping completion: {}", e),
        }
    }

    /// Completed → Idle once the hold is over
    pub fn settle(&self, epoch: u64) {
        let Ok(mut timer) = self.lock_timer() else {
            warn!("Timer lock poisoned, cannot settle");
            return;
        };
        if timer.epoch() == epoch && timer.settle() {
            self.lock_tasks().completion = None;
            debug!("Timer back to idle");
            self.publish(&timer);
        }
    }

    /// Bump the animation frame; false once the running span `epoch` is over
    pub fn advance_frame(&self, epoch: u64) -> bool {
        let live = self
            .lock_timer()
            .map(|timer| timer.phase() == Phase::Running && timer.epoch() == epoch)
            .unwrap_or(false);
        if live {
            self.animation_frame.fetch_add(1, Ordering::Relaxed);
        }
        live
    }

    pub fn animation_frame(&self) -> u64 {
        self.animation_frame.load(Ordering::Relaxed)
    }

    /// Floating phrase positions for the current state
    pub fn floating_frame(&self) -> Result<(TimerSnapshot, Vec<GlyphFrame>), TimerError> {
        let snapshot = self.snapshot()?;
        let glyphs = self.floating_text.frame(
            snapshot.eased_progress(),
            self.animation_frame(),
            snapshot.phase == Phase::Running,
        );
        Ok((snapshot, glyphs))
    }

    pub fn floating_text(&self) -> &FloatingText {
        &self.floating_text
    }

    pub fn task_title(&self) -> TaskTitle {
        self.lock(&self.task_title).clone()
    }

    /// Replace the task title; a rejected edit keeps the current one
    pub fn set_task_title(&self, input: &str) -> Result<TaskTitle, TitleError> {
        let title = TaskTitle::parse(input)?;
        *self.lock(&self.task_title) = title.clone();
        info!("Task title set to {}", title);
        self.record_action("title");
        Ok(title)
    }

    pub fn audio_playing(&self) -> bool {
        self.lock(&self.audio).is_playing()
    }

    pub fn toggle_audio(&self) -> bool {
        let playing = self.lock(&self.audio).toggle();
        info!("Background track {}", if playing { "playing" } else { "paused" });
        self.record_action("audio");
        playing
    }

    /// Open a scanning session; `camera` reports whether the camera could be acquired
    pub fn open_scan(&self, camera: Result<(), ScanError>) -> ScanSession {
        let session = ScanSession::open(camera);
        *self.lock(&self.scan) = session.clone();
        session
    }

    /// Classify a decoded payload and dispatch it
    pub fn submit_scan(&self, payload: &str) -> Result<ScanOutcome, ScanError> {
        let outcome = self.lock(&self.scan).submit(payload)?;
        match &outcome {
            ScanOutcome::ShowCard(card) => {
                info!("Showing card {}", card);
                *self.lock(&self.displayed_card) = Some(*card);
            }
            ScanOutcome::OpenLink(link) => info!("Scanned external link {}", link),
            ScanOutcome::ShowText(_) => info!("Scanned plain text"),
        }
        self.record_action("scan");
        Ok(outcome)
    }

    pub fn scan_open(&self) -> bool {
        self.lock(&self.scan).is_open()
    }

    pub fn displayed_card(&self) -> Option<CardId> {
        *self.lock(&self.displayed_card)
    }

    pub fn dismiss_card(&self) -> Option<CardId> {
        self.lock(&self.displayed_card).take()
    }

    /// Hand over a stats subscription so it is stopped with the coordinator
    pub fn attach_stats(&self, subscription: StatsSubscription) {
        if self.lock(&self.stats).replace(subscription).is_some() {
            debug!("Replaced previous stats subscription");
        }
    }

    pub fn latest_stats(&self) -> StatsReport {
        self.lock(&self.stats).as_ref().and_then(|s| s.latest())
    }

    pub fn tracker(&self) -> Arc<dyn SessionTracker> {
        self.notifier.tracker()
    }

    /// Tear down every task and resource tied to the screen
    pub fn shutdown(&self) {
        if let Ok(timer) = self.lock_timer() {
            debug!("Shutting down in phase {}", timer.phase());
        }
        self.lock_tasks().abort_all();
        if let Some(stats) = self.lock(&self.stats).take() {
            stats.stop();
        }
        self.lock(&self.audio).release();
        info!("Coordinator shut down");
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        crate::utils::format_duration(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.lock(&self.last_action).clone() {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    fn enter_completing(self: &Arc<Self>, timer: &TimerState, elapsed: Duration) {
        let mut tasks = self.lock_tasks();
        tasks.abort_all();
        tasks.completion = Some(tokio::spawn(completion_task(Arc::clone(self), timer.epoch())));
        self.notifier.session_completed(elapsed);
    }

    fn spawn_running(self: &Arc<Self>, tasks: &mut TaskSlots, epoch: u64) {
        tasks.stop_running();
        tasks.countdown = Some(tokio::spawn(countdown_task(Arc::clone(self), epoch)));
        tasks.frames = Some(tokio::spawn(frame_loop_task(Arc::clone(self), epoch)));
    }

    fn publish(&self, timer: &TimerState) -> TimerSnapshot {
        let snapshot = TimerSnapshot::of(timer);
        self.snapshot_tx.send_replace(snapshot.clone());
        if self.events_tx.receiver_count() > 0 {
            if let Err(e) = self.events_tx.send(snapshot.clone()) {
                warn!("Failed to send timer event: {}", e);
            }
        }
        snapshot
    }

    fn record_action(&self, action: &str) {
        *self.lock(&self.last_action) = Some((action.to_string(), Utc::now()));
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, TimerState>, TimerError> {
        self.timer.lock().map_err(|_| TimerError::Poisoned)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, TaskSlots> {
        self.lock(&self.tasks)
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
