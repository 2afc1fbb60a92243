// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout types, GPS samples and the finalized workout record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of tracked workout.
///
/// Serialized using the human label ("Running", "Outdoor Walk", ...) so that
/// records written by earlier app revisions stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum WorkoutType {
    /// Outdoor walk (the default workout).
    #[default]
    Walk,
    /// Treadmill or indoor walk.
    IndoorWalk,
    Run,
    Cycle,
    Hike,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 5] = [
        WorkoutType::Walk,
        WorkoutType::IndoorWalk,
        WorkoutType::Run,
        WorkoutType::Cycle,
        WorkoutType::Hike,
    ];

    /// Display label, also used as the storage representation.
    pub fn label(self) -> &'static str {
        match self {
            WorkoutType::Walk => "Outdoor Walk",
            WorkoutType::IndoorWalk => "Indoor Walk",
            WorkoutType::Run => "Running",
            WorkoutType::Cycle => "Cycling",
            WorkoutType::Hike => "Hiking",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown workout type label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown workout type: {0}")]
pub struct WorkoutTypeParseError(pub String);

impl FromStr for WorkoutType {
    type Err = WorkoutTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "walk" | "outdoor-walk" | "walking" => Ok(WorkoutType::Walk),
            "indoor-walk" | "indoorwalk" => Ok(WorkoutType::IndoorWalk),
            "run" | "running" => Ok(WorkoutType::Run),
            "cycle" | "cycling" | "ride" => Ok(WorkoutType::Cycle),
            "hike" | "hiking" => Ok(WorkoutType::Hike),
            _ => Err(WorkoutTypeParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for WorkoutType {
    type Error = WorkoutTypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkoutType> for String {
    fn from(value: WorkoutType) -> Self {
        value.label().to_string()
    }
}

/// A raw sample delivered by the location feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
    /// Horizontal accuracy radius in meters, when the provider reports one
    pub accuracy_m: Option<f32>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            captured_at,
            accuracy_m: None,
        }
    }
}

/// An accepted point of a workout route. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "timestampMs", with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
}

impl From<&LocationFix> for RoutePoint {
    fn from(fix: &LocationFix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            captured_at: fix.captured_at,
        }
    }
}

/// Finalized workout, created exactly once when a session stops.
///
/// Only `deleted` may change after creation (soft delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    pub workout_type: WorkoutType,
    /// Session start time
    #[serde(rename = "timestampMs", with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    /// Net duration (paused time excluded), whole minutes
    pub duration_minutes: i64,
    pub distance_km: f32,
    pub calories: i32,
    pub route: Vec<RoutePoint>,
    #[serde(default)]
    pub deleted: bool,
}
