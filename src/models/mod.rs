// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod profile;
pub mod snapshot;
pub mod stats;
pub mod workout;

pub use profile::{Gender, UserProfile};
pub use snapshot::{MetricsSnapshot, SessionPhase};
pub use stats::HistoryStats;
pub use workout::{LocationFix, RoutePoint, WorkoutRecord, WorkoutType, WorkoutTypeParseError};
