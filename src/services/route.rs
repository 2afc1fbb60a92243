// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route accumulation with GPS jump filtering.

use crate::models::{LocationFix, RoutePoint};
use geo::{Distance, Haversine, Point};

/// Segments at or above this length are GPS glitches (~60 km/h over the
/// feed's nominal 3 s interval).
pub const JUMP_THRESHOLD_METERS: f64 = 50.0;

/// What happened to a fix handed to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    /// First fix of the session: stored, no distance added.
    First,
    /// Appended to the route; `segment_m` was added to the total.
    Accepted { segment_m: f64 },
    /// Dropped as a GPS jump; nothing changed.
    RejectedJump { jump_m: f64 },
    /// Arrived while the session was not running.
    Discarded,
}

/// Ordered accepted fixes plus the running distance total.
#[derive(Debug, Clone)]
pub struct RouteAccumulator {
    jump_threshold_m: f64,
    points: Vec<RoutePoint>,
    total_distance_m: f64,
    last_accepted: Option<RoutePoint>,
    rejected_jumps: u32,
}

impl Default for RouteAccumulator {
    fn default() -> Self {
        Self::new(JUMP_THRESHOLD_METERS)
    }
}

impl RouteAccumulator {
    pub fn new(jump_threshold_m: f64) -> Self {
        Self {
            jump_threshold_m,
            points: Vec::new(),
            total_distance_m: 0.0,
            last_accepted: None,
            rejected_jumps: 0,
        }
    }

    /// Feed one fix through the jump filter.
    ///
    /// A rejected fix does not replace the reference point: the next fix is
    /// compared against the same last good fix.
    pub fn accept(&mut self, fix: &LocationFix) -> FixOutcome {
        let point = RoutePoint::from(fix);

        let Some(last) = self.last_accepted else {
            self.points.push(point);
            self.last_accepted = Some(point);
            return FixOutcome::First;
        };

        let segment_m = haversine_m(&last, &point);
        if segment_m >= self.jump_threshold_m {
            self.rejected_jumps += 1;
            tracing::debug!(
                jump_m = segment_m,
                threshold_m = self.jump_threshold_m,
                "GPS jump detected, ignoring fix"
            );
            return FixOutcome::RejectedJump { jump_m: segment_m };
        }

        self.points.push(point);
        self.total_distance_m += segment_m;
        self.last_accepted = Some(point);
        FixOutcome::Accepted { segment_m }
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_m / 1000.0
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn rejected_jumps(&self) -> u32 {
        self.rejected_jumps
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Great-circle distance between two route points in meters.
pub fn haversine_m(a: &RoutePoint, b: &RoutePoint) -> f64 {
    Haversine.distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    )
}

/// Encode a route as a Google polyline (precision 5) for map display.
pub fn encode_route_polyline(points: &[RoutePoint]) -> Result<String, RouteError> {
    let coords = points.iter().map(|p| geo::coord! { x: p.longitude, y: p.latitude });
    polyline::encode_coordinates(coords, 5).map_err(|e| RouteError::PolylineError(e.to_string()))
}

/// Errors from route encoding.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Failed to encode polyline: {0}")]
    PolylineError(String),
}
