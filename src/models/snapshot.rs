// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Session phase and the live metrics pushed once per tick.

use crate::models::WorkoutType;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the workout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
}

impl SessionPhase {
    /// True while a workout is in progress (running or paused).
    pub fn is_active(self) -> bool {
        matches!(self, SessionPhase::Running | SessionPhase::Paused)
    }
}

/// Immutable view of an in-progress workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub workout_type: WorkoutType,
    pub phase: SessionPhase,
    pub duration_seconds: i64,
    pub distance_km: f64,
    pub calories: i32,
    pub is_paused: bool,
    pub route_points: usize,
}
