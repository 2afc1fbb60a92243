// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily step-count derivations: stride distance, active minutes and calories.

use crate::models::{Gender, UserProfile};
use chrono::{DateTime, Utc};

/// Steps per minute needed for a minute to count as active.
pub const ACTIVE_STEPS_PER_MINUTE: u32 = 20;

/// Estimated stride length in meters from body height.
pub fn stride_length_m(height_cm: u32, gender: Gender) -> f64 {
    let factor = match gender {
        Gender::Male => 0.415,
        Gender::Female => 0.413,
    };
    f64::from(height_cm) * factor / 100.0
}

/// Distance covered by a number of steps, in km.
pub fn steps_to_distance_km(steps: u32, height_cm: u32, gender: Gender) -> f64 {
    f64::from(steps) * stride_length_m(height_cm, gender) / 1000.0
}

/// Walking intensity inferred from the day's step count.
pub fn walking_met_for_steps(steps: u32) -> f64 {
    match steps {
        0..=2999 => 2.0,
        3000..=6999 => 3.5,
        _ => 5.0,
    }
}

/// Daily calories from steps and active time; 0 until the profile is complete.
pub fn estimate_daily_calories(steps: u32, active_minutes: u32, profile: &UserProfile) -> i32 {
    if !profile.is_complete() {
        return 0;
    }

    let hours = f64::from(active_minutes) / 60.0;
    (walking_met_for_steps(steps) * profile.weight_kg * hours) as i32
}

/// Accumulates active minutes from cumulative step counts.
///
/// Each evaluation at least one whole minute after the previous one counts the
/// elapsed minutes as active when enough steps were taken in between.
#[derive(Debug, Clone)]
pub struct ActiveMinutesTracker {
    last_step_count: u32,
    last_update: DateTime<Utc>,
    total_active_minutes: u32,
}

impl ActiveMinutesTracker {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_step_count: 0,
            last_update: now,
            total_active_minutes: 0,
        }
    }

    /// Record the current cumulative step count; returns total active minutes.
    ///
    /// A count below the previous one means the step counter restarted (a new
    /// day), so the tracker starts over from that count.
    pub fn record(&mut self, current_steps: u32, now: DateTime<Utc>) -> u32 {
        if current_steps < self.last_step_count {
            self.reset(now);
            self.last_step_count = current_steps;
            return 0;
        }

        let minutes = (now - self.last_update).num_minutes();
        if minutes < 1 {
            return self.total_active_minutes;
        }

        let steps_taken = current_steps.saturating_sub(self.last_step_count);
        if steps_taken >= ACTIVE_STEPS_PER_MINUTE {
            self.total_active_minutes = self
                .total_active_minutes
                .saturating_add(u32::try_from(minutes).unwrap_or(u32::MAX));
        }

        self.last_step_count = current_steps;
        self.last_update = now;
        self.total_active_minutes
    }

    /// Cumulative step count seen by the last `record`.
    pub fn step_count(&self) -> u32 {
        self.last_step_count
    }

    pub fn total_active_minutes(&self) -> u32 {
        self.total_active_minutes
    }

    /// Start a new day.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stride_by_gender() {
        assert!((stride_length_m(175, Gender::Male) - 0.72625).abs() < 1e-9);
        assert!((stride_length_m(175, Gender::Female) - 0.72275).abs() < 1e-9);
    }

    #[test]
    fn test_steps_to_distance() {
        let km = steps_to_distance_km(10_000, 180, Gender::Male);
        assert!((km - 7.47).abs() < 1e-9);
    }

    #[test]
    fn test_met_bands() {
        assert_eq!(walking_met_for_steps(0), 2.0);
        assert_eq!(walking_met_for_steps(3000), 3.5);
        assert_eq!(walking_met_for_steps(7000), 5.0);
    }

    #[test]
    fn test_daily_calories() {
        let profile = UserProfile::default();
        // 3.5 * 70 * 1h
        assert_eq!(estimate_daily_calories(5000, 60, &profile), 245);

        let incomplete = UserProfile {
            height_cm: 0,
            ..UserProfile::default()
        };
        assert_eq!(estimate_daily_calories(5000, 60, &incomplete), 0);
    }

    #[test]
    fn test_active_minutes() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut tracker = ActiveMinutesTracker::new(start);

        // Less than a minute: nothing evaluated
        assert_eq!(tracker.record(100, start + Duration::seconds(30)), 0);
        // Two minutes with enough steps
        assert_eq!(tracker.record(100, start + Duration::minutes(2)), 2);
        // One minute with too few steps
        assert_eq!(tracker.record(110, start + Duration::minutes(3)), 2);
        assert_eq!(tracker.record(200, start + Duration::minutes(4)), 3);

        tracker.reset(start + Duration::minutes(5));
        assert_eq!(tracker.total_active_minutes(), 0);
    }

    #[test]
    fn test_active_minutes_saturate_after_long_gap() {
        let start = DateTime::from_timestamp(0, 0).unwrap();
        let mut tracker = ActiveMinutesTracker::new(start);

        // Gap larger than u32::MAX minutes
        let far = start + Duration::minutes(i64::from(u32::MAX) + 10);
        assert_eq!(tracker.record(1_000, far), u32::MAX);
        assert_eq!(
            tracker.record(2_000, far + Duration::minutes(5)),
            u32::MAX
        );
    }

    #[test]
    fn test_lower_step_count_starts_new_day() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut tracker = ActiveMinutesTracker::new(start);
        assert_eq!(tracker.record(5_000, start + Duration::minutes(10)), 10);

        // Counter restarted overnight
        let next_day = start + Duration::hours(20);
        assert_eq!(tracker.record(30, next_day), 0);
        assert_eq!(tracker.record(80, next_day + Duration::minutes(2)), 2);
        assert_eq!(tracker.step_count(), 80);
    }
}
