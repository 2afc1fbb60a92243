// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ongoing-workout notification seam.

use crate::models::MetricsSnapshot;
use crate::time_utils::format_clock;

/// Receives every metrics tick and user-facing notices.
pub trait NotificationPresenter: Send + Sync {
    fn present(&self, snapshot: &MetricsSnapshot);

    /// One-off notice, e.g. a workout aborted because permission was lost.
    fn notice(&self, message: &str);
}

/// Text of the ongoing notification, e.g. "Running - 12:05 - 1.23 km".
pub fn notification_text(snapshot: &MetricsSnapshot) -> String {
    let status = if snapshot.is_paused { "Paused" } else { "Workout" };
    format!(
        "{} ({}) - {} - {:.2} km",
        status,
        snapshot.workout_type,
        format_clock(snapshot.duration_seconds),
        snapshot.distance_km
    )
}

/// Presenter that writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl NotificationPresenter for TracingPresenter {
    fn present(&self, snapshot: &MetricsSnapshot) {
        tracing::debug!(
            calories = snapshot.calories,
            points = snapshot.route_points,
            "{}",
            notification_text(snapshot)
        );
    }

    fn notice(&self, message: &str) {
        tracing::warn!(notice = message, "Workout notice");
    }
}
