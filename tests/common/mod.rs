// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use fittrack::config::Config;
use fittrack::db::MemoryDb;
use fittrack::models::{LocationFix, MetricsSnapshot};
use fittrack::routes::create_router;
use fittrack::services::daily::ActiveMinutesTracker;
use fittrack::services::{
    ChannelLocationFeed, ManualClock, NotificationPresenter, TrackerDeps, TrackerHandle,
};
use fittrack::AppState;
use std::sync::{Arc, Mutex};

/// Fixed start time for deterministic durations.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Fix `secs` after the base time.
#[allow(dead_code)]
pub fn fix_at(lat: f64, lon: f64, secs: i64) -> LocationFix {
    LocationFix::new(lat, lon, base_time() + chrono::Duration::seconds(secs))
}

/// Presenter that records everything it is shown.
#[derive(Default)]
pub struct RecordingPresenter {
    pub presented: Mutex<Vec<MetricsSnapshot>>,
    pub notices: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingPresenter {
    pub fn presented_count(&self) -> usize {
        self.presented.lock().unwrap().len()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl NotificationPresenter for RecordingPresenter {
    fn present(&self, snapshot: &MetricsSnapshot) {
        self.presented.lock().unwrap().push(snapshot.clone());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

/// Tracker wired to in-memory collaborators the test can drive.
#[allow(dead_code)]
pub struct TestTracker {
    pub tracker: TrackerHandle,
    pub db: MemoryDb,
    pub clock: Arc<ManualClock>,
    pub feed: Arc<ChannelLocationFeed>,
    pub presenter: Arc<RecordingPresenter>,
}

#[allow(dead_code)]
pub fn spawn_test_tracker(config: &Config) -> TestTracker {
    let db = MemoryDb::new();
    let clock = Arc::new(ManualClock::new(base_time()));
    let feed = Arc::new(ChannelLocationFeed::new(config.feed_capacity));
    let presenter = Arc::new(RecordingPresenter::default());

    let tracker = TrackerHandle::spawn(
        config.tracker_config(),
        TrackerDeps {
            clock: clock.clone(),
            feed: feed.clone(),
            history: Arc::new(db.clone()),
            profiles: Arc::new(db.clone()),
            presenter: presenter.clone(),
        },
    );

    TestTracker {
        tracker,
        db,
        clock,
        feed,
        presenter,
    }
}

/// Create a test app backed by an in-memory store.
/// Returns the router, the shared state and the tracker harness.
#[allow(dead_code)]
pub fn create_test_app_with_harness() -> (axum::Router, Arc<AppState>, TestTracker) {
    let config = Config::test_default();
    let harness = spawn_test_tracker(&config);

    let state = Arc::new(AppState {
        config,
        tracker: harness.tracker.clone(),
        history: Arc::new(harness.db.clone()),
        profiles: Arc::new(harness.db.clone()),
        feed: harness.feed.clone(),
        daily_activity: Mutex::new(ActiveMinutesTracker::new(base_time())),
    });

    (create_router(state.clone()), state, harness)
}

/// Create a test app backed by an in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let (app, state, _) = create_test_app_with_harness();
    (app, state)
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
