// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie estimates.
//!
//! Two models are kept because callers pick whichever signal they trust more:
//! - MET x weight x hours, for timed GPS workouts
//! - kcal per kg per km, for the daily step count where only distance is known

use crate::models::WorkoutType;

/// Walking energy cost in kcal per kg of body weight per km.
pub const WALKING_KCAL_PER_KG_KM: f64 = 0.57;

/// Metabolic equivalent for a workout type.
pub fn met_for(workout_type: WorkoutType) -> f64 {
    match workout_type {
        WorkoutType::Run => 8.0,
        WorkoutType::Cycle => 6.0,
        WorkoutType::IndoorWalk => 3.5,
        WorkoutType::Walk | WorkoutType::Hike => 4.0,
    }
}

/// Calories for a timed workout, truncated to whole kcal.
pub fn estimate_by_duration(
    workout_type: WorkoutType,
    duration_minutes: i64,
    body_weight_kg: f64,
) -> i32 {
    if duration_minutes <= 0 || body_weight_kg <= 0.0 {
        return 0;
    }

    let hours = duration_minutes as f64 / 60.0;
    (met_for(workout_type) * body_weight_kg * hours) as i32
}

/// Calories for a walked distance, truncated to whole kcal.
pub fn estimate_by_distance(distance_km: f64, body_weight_kg: f64) -> i32 {
    if distance_km <= 0.0 || body_weight_kg <= 0.0 {
        return 0;
    }

    let per_km = WALKING_KCAL_PER_KG_KM * body_weight_kg;
    (per_km * distance_km) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_half_hour() {
        assert_eq!(estimate_by_duration(WorkoutType::Run, 30, 70.0), 280);
    }

    #[test]
    fn test_met_table() {
        assert_eq!(met_for(WorkoutType::Run), 8.0);
        assert_eq!(met_for(WorkoutType::Cycle), 6.0);
        assert_eq!(met_for(WorkoutType::IndoorWalk), 3.5);
        assert_eq!(met_for(WorkoutType::Walk), 4.0);
        assert_eq!(met_for(WorkoutType::Hike), 4.0);
    }

    #[test]
    fn test_truncates() {
        // 3.5 * 71 * (7/60) = 28.99
        assert_eq!(estimate_by_duration(WorkoutType::IndoorWalk, 7, 71.0), 28);
    }

    #[test]
    fn test_non_positive_inputs() {
        assert_eq!(estimate_by_duration(WorkoutType::Run, 0, 70.0), 0);
        assert_eq!(estimate_by_duration(WorkoutType::Run, -5, 70.0), 0);
        assert_eq!(estimate_by_duration(WorkoutType::Run, 30, 0.0), 0);
        assert_eq!(estimate_by_distance(0.0, 70.0), 0);
        assert_eq!(estimate_by_distance(5.0, -1.0), 0);
    }

    #[test]
    fn test_by_distance() {
        // 0.57 * 70 = 39.9 kcal/km
        assert_eq!(estimate_by_distance(5.0, 70.0), 199);
    }
}
