// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Clock sources and net-duration accounting.

use crate::models::SessionPhase;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of "now" for the session.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Net active time of a session in milliseconds.
///
/// While paused the clock is frozen at the start of the current pause. The
/// result is clamped to zero so clock skew never yields a negative duration.
pub fn elapsed_net_ms(
    now: DateTime<Utc>,
    started_at: DateTime<Utc>,
    paused_accumulated_ms: i64,
    phase: SessionPhase,
    current_pause_started_at: Option<DateTime<Utc>>,
) -> i64 {
    let end = match (phase, current_pause_started_at) {
        (SessionPhase::Idle, _) => return 0,
        (SessionPhase::Paused, Some(pause_started)) => pause_started,
        _ => now,
    };

    let net = (end - started_at).num_milliseconds() - paused_accumulated_ms;
    net.max(0)
}

/// Length of a pause that ends at `now`, never negative.
pub fn pause_length_ms(pause_started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - pause_started_at).num_milliseconds().max(0)
}
