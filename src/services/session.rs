// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session state machine.
//!
//! Lifecycle: Idle -> Running <-> Paused -> Stopped. Stopping happens in two
//! halves so the caller can persist in between:
//! 1. `finalize` computes duration and calories while the session is still
//!    active and assembles the record
//! 2. the caller appends the record to history
//! 3. `complete_stop` moves the session to Stopped
//!
//! All mutation goes through `&mut self`; the tracker actor is the only owner.

use crate::models::{LocationFix, MetricsSnapshot, SessionPhase, WorkoutRecord, WorkoutType};
use crate::services::calories;
use crate::services::route::{FixOutcome, RouteAccumulator, JUMP_THRESHOLD_METERS};
use crate::services::timing::{self, ClockSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Errors returned by lifecycle commands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {command} while {from:?}")]
    InvalidTransition {
        from: SessionPhase,
        command: &'static str,
    },

    #[error("A workout is already active")]
    AlreadyActive,

    #[error("No active workout")]
    NoActiveSession,

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location updates unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Failed to save workout {id}: {reason}")]
    Persistence { id: String, reason: String },

    #[error("Workout {id} has not been saved yet")]
    UnsavedWorkout { id: String },

    #[error("No unsaved workout to retry")]
    NothingToRetry,

    #[error("Workout tracker is not running")]
    TrackerUnavailable,
}

/// Mutable state of the current session.
#[derive(Debug, Clone)]
pub struct WorkoutSessionState {
    pub workout_type: WorkoutType,
    pub phase: SessionPhase,
    pub started_at: DateTime<Utc>,
    pub paused_accumulated_ms: i64,
    pub current_pause_started_at: Option<DateTime<Utc>>,
    /// Accepted fixes, last good fix and the distance total
    pub route: RouteAccumulator,
}

impl WorkoutSessionState {
    pub fn net_duration_ms(&self, now: DateTime<Utc>) -> i64 {
        timing::elapsed_net_ms(
            now,
            self.started_at,
            self.paused_accumulated_ms,
            self.phase,
            self.current_pause_started_at,
        )
    }
}

/// The workout state machine.
pub struct WorkoutSession {
    clock: Arc<dyn ClockSource>,
    jump_threshold_m: f64,
    state: Option<WorkoutSessionState>,
}

impl WorkoutSession {
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self::with_jump_threshold(clock, JUMP_THRESHOLD_METERS)
    }

    pub fn with_jump_threshold(clock: Arc<dyn ClockSource>, jump_threshold_m: f64) -> Self {
        Self {
            clock,
            jump_threshold_m,
            state: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.as_ref().map_or(SessionPhase::Idle, |s| s.phase)
    }

    /// Whether a workout is in progress. The only "workout active" flag.
    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    pub fn state(&self) -> Option<&WorkoutSessionState> {
        self.state.as_ref()
    }

    /// Begin a new session. A finished (Stopped) session is replaced.
    pub fn start(&mut self, workout_type: WorkoutType) -> Result<(), SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }

        let now = self.clock.now();
        self.state = Some(WorkoutSessionState {
            workout_type,
            phase: SessionPhase::Running,
            started_at: now,
            paused_accumulated_ms: 0,
            current_pause_started_at: None,
            route: RouteAccumulator::new(self.jump_threshold_m),
        });

        tracing::info!(workout_type = %workout_type, started_at = %now, "Workout started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        let now = self.clock.now();
        let state = self.active_state_mut()?;
        if state.phase != SessionPhase::Running {
            return Err(SessionError::InvalidTransition {
                from: state.phase,
                command: "pause",
            });
        }

        state.current_pause_started_at = Some(now);
        state.phase = SessionPhase::Paused;
        tracing::info!(distance_m = state.route.total_distance_m(), "Workout paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        let now = self.clock.now();
        let state = self.active_state_mut()?;
        if state.phase != SessionPhase::Paused {
            return Err(SessionError::InvalidTransition {
                from: state.phase,
                command: "resume",
            });
        }

        let pause_ms = state
            .current_pause_started_at
            .take()
            .map_or(0, |started| timing::pause_length_ms(started, now));
        state.paused_accumulated_ms += pause_ms;
        state.phase = SessionPhase::Running;
        tracing::info!(
            pause_ms,
            paused_total_ms = state.paused_accumulated_ms,
            "Workout resumed"
        );
        Ok(())
    }

    /// Route a fix from the location feed. Fixes outside Running are dropped.
    pub fn on_location_fix(&mut self, fix: &LocationFix) -> FixOutcome {
        match self.state.as_mut() {
            Some(state) if state.phase == SessionPhase::Running => state.route.accept(fix),
            _ => FixOutcome::Discarded,
        }
    }

    /// Live metrics for the periodic tick. Reads only.
    pub fn snapshot(&self, body_weight_kg: f64) -> Option<MetricsSnapshot> {
        let state = self.state.as_ref().filter(|s| s.phase.is_active())?;
        let net_ms = state.net_duration_ms(self.clock.now());

        Some(MetricsSnapshot {
            workout_type: state.workout_type,
            phase: state.phase,
            duration_seconds: net_ms / 1000,
            distance_km: state.route.total_distance_km(),
            calories: calories::estimate_by_duration(
                state.workout_type,
                net_ms / 60_000,
                body_weight_kg,
            ),
            is_paused: state.phase == SessionPhase::Paused,
            route_points: state.route.len(),
        })
    }

    /// Stop, first half: compute final duration and calories while the session
    /// is still active, then assemble the record with a fresh id.
    ///
    /// The session stays active until `complete_stop`.
    pub fn finalize(&self, body_weight_kg: f64) -> Result<WorkoutRecord, SessionError> {
        let state = self
            .state
            .as_ref()
            .filter(|s| s.phase.is_active())
            .ok_or(SessionError::NoActiveSession)?;

        let net_ms = state.net_duration_ms(self.clock.now());
        let duration_minutes = net_ms / 60_000;
        let calories =
            calories::estimate_by_duration(state.workout_type, duration_minutes, body_weight_kg);

        let record = WorkoutRecord {
            id: uuid::Uuid::new_v4().to_string(),
            workout_type: state.workout_type,
            started_at: state.started_at,
            duration_minutes,
            distance_km: state.route.total_distance_km() as f32,
            calories,
            route: state.route.points().to_vec(),
            deleted: false,
        };

        tracing::info!(
            id = %record.id,
            workout_type = %record.workout_type,
            duration_ms = net_ms,
            distance_km = record.distance_km,
            calories = record.calories,
            points = record.route.len(),
            rejected_jumps = state.route.rejected_jumps(),
            "Workout finalized"
        );
        Ok(record)
    }

    /// Stop, second half: the session becomes Stopped.
    pub fn complete_stop(&mut self) -> Result<(), SessionError> {
        let state = self.active_state_mut()?;
        state.phase = SessionPhase::Stopped;
        state.current_pause_started_at = None;
        Ok(())
    }

    /// Stop without creating a record (e.g. location permission lost).
    pub fn abort(&mut self) -> Result<(), SessionError> {
        let state = self.active_state_mut()?;
        tracing::warn!(
            workout_type = %state.workout_type,
            points = state.route.len(),
            "Workout aborted without a record"
        );
        state.phase = SessionPhase::Stopped;
        state.current_pause_started_at = None;
        Ok(())
    }

    fn active_state_mut(&mut self) -> Result<&mut WorkoutSessionState, SessionError> {
        self.state
            .as_mut()
            .filter(|s| s.phase.is_active())
            .ok_or(SessionError::NoActiveSession)
    }
}
