// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitTrack: workout session tracking
//!
//! This crate runs a single workout session at a time (start, pause, resume,
//! stop), accumulates a filtered GPS route, estimates calories, and keeps a
//! local history of finished workouts.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{ProfileStore, WorkoutHistoryStore};
use services::daily::ActiveMinutesTracker;
use services::{ChannelLocationFeed, TrackerHandle};
use std::sync::{Arc, Mutex};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tracker: TrackerHandle,
    pub history: Arc<dyn WorkoutHistoryStore>,
    pub profiles: Arc<dyn ProfileStore>,
    /// Platform side of the location feed the tracker subscribes to
    pub feed: Arc<ChannelLocationFeed>,
    /// Today's step count and active minutes
    pub daily_activity: Mutex<ActiveMinutesTracker>,
}
