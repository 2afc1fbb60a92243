// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout tracker actor.
//!
//! One tokio task owns the `WorkoutSession` and serializes its three event
//! sources into state changes:
//! - lifecycle commands from `TrackerHandle` (mpsc + oneshot reply)
//! - location events from the `LocationFeed`
//! - the periodic metrics tick (only while a workout is active)
//!
//! Readers get the latest `MetricsSnapshot` from a `watch` channel and never
//! observe a half-applied mutation.

use crate::db::{ProfileStore, WorkoutHistoryStore};
use crate::models::{
    LocationFix, MetricsSnapshot, SessionPhase, UserProfile, WorkoutRecord, WorkoutType,
};
use crate::services::feed::{FeedError, FeedEvent, LocationFeed};
use crate::services::notify::NotificationPresenter;
use crate::services::route::{FixOutcome, JUMP_THRESHOLD_METERS};
use crate::services::session::{SessionError, WorkoutSession};
use crate::services::timing::ClockSource;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};

const COMMAND_BUFFER: usize = 32;

/// Tracker tuning.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Metrics tick period
    pub tick_interval: Duration,
    /// GPS jump filter threshold
    pub jump_threshold_m: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            jump_threshold_m: JUMP_THRESHOLD_METERS,
        }
    }
}

/// Collaborators the tracker talks to.
#[derive(Clone)]
pub struct TrackerDeps {
    pub clock: Arc<dyn ClockSource>,
    pub feed: Arc<dyn LocationFeed>,
    pub history: Arc<dyn WorkoutHistoryStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub presenter: Arc<dyn NotificationPresenter>,
}

/// Point-in-time view of the tracker for status queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatus {
    pub phase: SessionPhase,
    pub active: bool,
    pub snapshot: Option<MetricsSnapshot>,
    /// Finalized workout that could not be saved yet
    pub pending_record_id: Option<String>,
    pub last_notice: Option<String>,
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Command {
    Start {
        workout_type: WorkoutType,
        reply: Reply<()>,
    },
    Pause {
        reply: Reply<()>,
    },
    Resume {
        reply: Reply<()>,
    },
    Stop {
        reply: Reply<WorkoutRecord>,
    },
    RetrySave {
        reply: Reply<WorkoutRecord>,
    },
    Status {
        reply: oneshot::Sender<TrackerStatus>,
    },
}

/// Cloneable handle to the tracker task.
///
/// The task exits when the last handle is dropped.
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Option<MetricsSnapshot>>,
}

impl TrackerHandle {
    /// Spawn the tracker task on the current tokio runtime.
    pub fn spawn(config: TrackerConfig, deps: TrackerDeps) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(None);

        let actor = TrackerActor {
            session: WorkoutSession::with_jump_threshold(
                deps.clock.clone(),
                config.jump_threshold_m,
            ),
            config,
            deps,
            feed_rx: None,
            ticker: None,
            body_weight_kg: UserProfile::default().weight_kg,
            pending: None,
            last_notice: None,
            snapshots: snapshot_tx,
        };
        tokio::spawn(actor.run(command_rx));

        Self {
            commands,
            snapshots,
        }
    }

    pub async fn start(&self, workout_type: WorkoutType) -> Result<(), SessionError> {
        self.request(|reply| Command::Start {
            workout_type,
            reply,
        })
        .await?
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Pause { reply }).await?
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Resume { reply }).await?
    }

    /// Stop the workout. Returns once the record is durably stored.
    pub async fn stop(&self) -> Result<WorkoutRecord, SessionError> {
        self.request(|reply| Command::Stop { reply }).await?
    }

    /// Retry saving a workout whose stop failed to persist.
    pub async fn retry_save(&self) -> Result<WorkoutRecord, SessionError> {
        self.request(|reply| Command::RetrySave { reply }).await?
    }

    pub async fn status(&self) -> Result<TrackerStatus, SessionError> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Latest published snapshot (None when no workout is active).
    pub fn latest(&self) -> Option<MetricsSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Snapshot stream; only the latest value is kept.
    pub fn subscribe(&self) -> watch::Receiver<Option<MetricsSnapshot>> {
        self.snapshots.clone()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| SessionError::TrackerUnavailable)?;
        rx.await.map_err(|_| SessionError::TrackerUnavailable)
    }
}

enum Event {
    Command(Option<Command>),
    Feed(Option<FeedEvent>),
    Tick,
}

struct TrackerActor {
    session: WorkoutSession,
    config: TrackerConfig,
    deps: TrackerDeps,
    feed_rx: Option<mpsc::Receiver<FeedEvent>>,
    ticker: Option<Interval>,
    /// Cached at start so ticks never wait on storage
    body_weight_kg: f64,
    pending: Option<WorkoutRecord>,
    last_notice: Option<String>,
    snapshots: watch::Sender<Option<MetricsSnapshot>>,
}

impl TrackerActor {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!("Workout tracker started");

        loop {
            // Feed events queued before a command are applied before it.
            let event = tokio::select! {
                biased;
                event = next_feed_event(&mut self.feed_rx) => Event::Feed(event),
                command = commands.recv() => Event::Command(command),
                _ = next_tick(&mut self.ticker) => Event::Tick,
            };

            match event {
                Event::Command(Some(command)) => self.handle_command(command).await,
                Event::Command(None) => break,
                Event::Feed(Some(event)) => self.handle_feed_event(event),
                Event::Feed(None) => self.handle_feed_closed(),
                Event::Tick => self.tick(),
            }
        }

        if self.session.is_active() {
            tracing::warn!(
                phase = ?self.session.phase(),
                "Tracker shut down with an active workout; no record saved"
            );
            self.release_resources();
        }
        if let Some(pending) = &self.pending {
            tracing::error!(id = %pending.id, "Tracker shut down with an unsaved workout");
        }
        tracing::debug!("Workout tracker stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start {
                workout_type,
                reply,
            } => {
                let result = self.handle_start(workout_type).await;
                let _ = reply.send(result);
            }
            Command::Pause { reply } => {
                let result = self.session.pause();
                self.after_transition(&result);
                let _ = reply.send(result);
            }
            Command::Resume { reply } => {
                let result = self.session.resume();
                self.after_transition(&result);
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                let result = self.handle_stop().await;
                let _ = reply.send(result);
            }
            Command::RetrySave { reply } => {
                let result = self.handle_retry().await;
                let _ = reply.send(result);
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    async fn handle_start(&mut self, workout_type: WorkoutType) -> Result<(), SessionError> {
        if let Some(pending) = &self.pending {
            return Err(SessionError::UnsavedWorkout {
                id: pending.id.clone(),
            });
        }

        self.session.start(workout_type)?;
        self.last_notice = None;

        let rx = match self.deps.feed.subscribe() {
            Ok(rx) => rx,
            Err(FeedError::PermissionDenied) => {
                tracing::warn!("Location permission denied, aborting workout");
                self.abort_session("Location permission denied; workout not started");
                return Err(SessionError::PermissionDenied);
            }
            Err(e @ (FeedError::NotSubscribed | FeedError::Full)) => {
                tracing::error!(error = %e, "Location feed subscription failed, aborting workout");
                self.abort_session("Location updates unavailable; workout not started");
                return Err(SessionError::FeedUnavailable(e.to_string()));
            }
        };
        self.feed_rx = Some(rx);
        self.body_weight_kg = self.read_body_weight().await;
        self.ticker = Some(new_ticker(self.config.tick_interval));
        self.publish();
        Ok(())
    }

    /// Stop in order: finalize (duration, calories, record), persist, then
    /// mark the session stopped and release the feed and ticker.
    async fn handle_stop(&mut self) -> Result<WorkoutRecord, SessionError> {
        if !self.session.is_active() {
            return Err(SessionError::NoActiveSession);
        }

        let body_weight_kg = self.read_body_weight().await;
        let record = self.session.finalize(body_weight_kg)?;
        let saved = self.persist(&record).await;

        self.session.complete_stop()?;
        self.release_resources();

        match saved {
            Ok(()) => Ok(record),
            Err(reason) => {
                let id = record.id.clone();
                tracing::error!(id = %id, error = %reason, "Failed to save workout; keeping it for retry");
                self.deps
                    .presenter
                    .notice("Workout could not be saved; it will be kept until saving succeeds");
                self.pending = Some(record);
                Err(SessionError::Persistence { id, reason })
            }
        }
    }

    async fn handle_retry(&mut self) -> Result<WorkoutRecord, SessionError> {
        let record = self.pending.take().ok_or(SessionError::NothingToRetry)?;

        match self.persist(&record).await {
            Ok(()) => {
                tracing::info!(id = %record.id, "Pending workout saved on retry");
                Ok(record)
            }
            Err(reason) => {
                let id = record.id.clone();
                tracing::warn!(id = %id, error = %reason, "Retry save failed");
                self.pending = Some(record);
                Err(SessionError::Persistence { id, reason })
            }
        }
    }

    fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Fix(fix) => self.handle_fix(&fix),
            FeedEvent::PermissionRevoked => {
                if self.session.is_active() {
                    self.abort_session("Location permission revoked; workout discarded");
                }
            }
        }
    }

    /// The feed ended without a stop. A revocation whose event could not be
    /// queued looks like this, so an active workout is discarded.
    fn handle_feed_closed(&mut self) {
        self.feed_rx = None;
        if self.session.is_active() {
            tracing::warn!("Location feed closed during workout");
            self.abort_session("Location updates stopped; workout discarded");
        } else {
            tracing::debug!("Location feed closed");
        }
    }

    fn handle_fix(&mut self, fix: &LocationFix) {
        match self.session.on_location_fix(fix) {
            FixOutcome::Discarded => {
                tracing::trace!(phase = ?self.session.phase(), "Fix ignored outside running phase");
            }
            FixOutcome::RejectedJump { jump_m } => {
                tracing::debug!(jump_m, accuracy_m = ?fix.accuracy_m, "Fix rejected as GPS jump");
            }
            FixOutcome::First | FixOutcome::Accepted { .. } => {
                self.publish();
            }
        }
    }

    fn tick(&mut self) {
        if let Some(snapshot) = self.publish() {
            self.deps.presenter.present(&snapshot);
        }
    }

    fn after_transition(&mut self, result: &Result<(), SessionError>) {
        match result {
            Ok(()) => {
                if let Some(snapshot) = self.publish() {
                    self.deps.presenter.present(&snapshot);
                }
            }
            Err(e) => tracing::debug!(error = %e, "Lifecycle command rejected"),
        }
    }

    /// End the session without a record and surface a notice.
    fn abort_session(&mut self, notice: &str) {
        if let Err(e) = self.session.abort() {
            tracing::debug!(error = %e, "Abort without active session");
        }
        self.release_resources();
        self.deps.presenter.notice(notice);
        self.last_notice = Some(notice.to_string());
    }

    fn release_resources(&mut self) {
        self.deps.feed.unsubscribe();
        self.feed_rx = None;
        self.ticker = None;
        self.snapshots.send_replace(None);
    }

    fn publish(&mut self) -> Option<MetricsSnapshot> {
        let snapshot = self.session.snapshot(self.body_weight_kg);
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    fn status(&self) -> TrackerStatus {
        TrackerStatus {
            phase: self.session.phase(),
            active: self.session.is_active(),
            snapshot: self.session.snapshot(self.body_weight_kg),
            pending_record_id: self.pending.as_ref().map(|r| r.id.clone()),
            last_notice: self.last_notice.clone(),
        }
    }

    async fn read_body_weight(&self) -> f64 {
        let profiles = Arc::clone(&self.deps.profiles);
        match tokio::task::spawn_blocking(move || profiles.body_weight_kg()).await {
            Ok(Ok(weight)) => weight,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read body weight, using last known value");
                self.body_weight_kg
            }
            Err(e) => {
                tracing::warn!(error = %e, "Body weight lookup task failed");
                self.body_weight_kg
            }
        }
    }

    /// Append to history off the async threads and wait for completion.
    async fn persist(&self, record: &WorkoutRecord) -> Result<(), String> {
        let history = Arc::clone(&self.deps.history);
        let record = record.clone();
        match tokio::task::spawn_blocking(move || history.append(&record)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("Save task failed: {}", e)),
        }
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn next_feed_event(feed: &mut Option<mpsc::Receiver<FeedEvent>>) -> Option<FeedEvent> {
    match feed {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
