//! Workout history aggregates for the dashboard.
//!
//! Computed from the history listing; soft-deleted records are skipped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::WorkoutRecord;

/// Totals over all non-deleted workouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    // ─── Totals ──────────────────────────────────────────────────
    pub total_workouts: u32,
    pub total_distance_km: f64,
    pub total_calories: i64,
    pub total_minutes: i64,

    // ─── By Workout Type ─────────────────────────────────────────
    /// Workout count per type label (for pie charts)
    #[serde(default)]
    pub workouts_by_type: HashMap<String, u32>,
    /// Distance per type label (km)
    #[serde(default)]
    pub distance_by_type: HashMap<String, f64>,

    // ─── Time Series ─────────────────────────────────────────────
    /// Workout count per month ("YYYY-MM" format)
    #[serde(default)]
    pub workouts_by_month: HashMap<String, u32>,

    /// Start time of the most recent workout (ms since epoch)
    pub last_workout_ms: Option<i64>,
}

impl HistoryStats {
    /// Aggregate a history listing.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a WorkoutRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.add(record);
        }
        stats
    }

    /// Fold one record into the totals.
    ///
    /// Returns `false` (and changes nothing) for soft-deleted records.
    pub fn add(&mut self, record: &WorkoutRecord) -> bool {
        if record.deleted {
            return false;
        }

        let distance_km = f64::from(record.distance_km);
        let label = record.workout_type.label().to_string();

        self.total_workouts += 1;
        self.total_distance_km += distance_km;
        self.total_calories += i64::from(record.calories);
        self.total_minutes += record.duration_minutes;

        *self.workouts_by_type.entry(label.clone()).or_insert(0) += 1;
        *self.distance_by_type.entry(label).or_insert(0.0) += distance_km;

        let month_key = record.started_at.format("%Y-%m").to_string();
        *self.workouts_by_month.entry(month_key).or_insert(0) += 1;

        let started_ms = record.started_at.timestamp_millis();
        self.last_workout_ms = Some(self.last_workout_ms.map_or(started_ms, |ms| ms.max(started_ms)));

        true
    }
}
