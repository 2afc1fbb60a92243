// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout tracker lifecycle tests: stop persistence, pause accounting,
//! permission handling and the metrics tick.

use fittrack::config::Config;
use fittrack::db::{ProfileStore, WorkoutHistoryStore};
use fittrack::models::{SessionPhase, UserProfile, WorkoutType};
use fittrack::services::{
    FeedError, FeedEvent, LocationFeed, ManualClock, SessionError, TrackerDeps, TrackerHandle,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

mod common;

use common::fix_at;

#[tokio::test]
async fn test_stop_saves_exactly_one_record() {
    let t = common::spawn_test_tracker(&Config::test_default());

    t.tracker.start(WorkoutType::Run).await.unwrap();
    t.clock.advance_secs(30 * 60);
    let record = t.tracker.stop().await.unwrap();

    assert_eq!(record.workout_type, WorkoutType::Run);
    assert_eq!(record.duration_minutes, 30);
    assert_eq!(record.calories, 280);
    assert_eq!(record.started_at, common::base_time());
    assert_eq!(t.db.len(), 1);
    assert_eq!(t.db.get(&record.id).unwrap(), Some(record));

    // Second stop is rejected and writes nothing
    assert_eq!(
        t.tracker.stop().await.unwrap_err(),
        SessionError::NoActiveSession
    );
    assert_eq!(t.db.len(), 1);

    let status = t.tracker.status().await.unwrap();
    assert_eq!(status.phase, SessionPhase::Stopped);
    assert!(!status.active);
    assert!(status.snapshot.is_none());
    assert!(!t.feed.is_subscribed());
}

#[tokio::test]
async fn test_paused_time_is_excluded() {
    let t = common::spawn_test_tracker(&Config::test_default());

    t.tracker.start(WorkoutType::Walk).await.unwrap();
    t.clock.advance_secs(60);
    t.tracker.pause().await.unwrap();
    t.clock.advance_secs(30);
    t.tracker.resume().await.unwrap();
    t.clock.advance_secs(60);

    let status = t.tracker.status().await.unwrap();
    assert_eq!(status.snapshot.unwrap().duration_seconds, 120);

    let record = t.tracker.stop().await.unwrap();
    assert_eq!(record.duration_minutes, 2);
    // 4.0 MET x 70 kg x 2/60 h
    assert_eq!(record.calories, 9);
}

#[tokio::test]
async fn test_route_filters_jumps_and_paused_fixes() {
    let t = common::spawn_test_tracker(&Config::test_default());
    t.tracker.start(WorkoutType::Walk).await.unwrap();

    t.feed.push_fix(fix_at(0.0, 0.0, 0)).unwrap();
    t.feed.push_fix(fix_at(0.0003, 0.0, 3)).unwrap();
    t.feed.push_fix(fix_at(0.01, 0.0, 6)).unwrap();

    let snapshot = t.tracker.status().await.unwrap().snapshot.unwrap();
    assert_eq!(snapshot.route_points, 2);

    t.tracker.pause().await.unwrap();
    t.feed.push_fix(fix_at(0.00033, 0.0, 9)).unwrap();
    let snapshot = t.tracker.status().await.unwrap().snapshot.unwrap();
    assert_eq!(snapshot.route_points, 2);
    assert!(snapshot.is_paused);

    t.tracker.resume().await.unwrap();
    t.feed.push_fix(fix_at(0.00033, 0.0, 12)).unwrap();

    let record = t.tracker.stop().await.unwrap();
    assert_eq!(record.route.len(), 3);
    assert!(
        (record.distance_km - 0.0367).abs() < 0.001,
        "unexpected distance {}",
        record.distance_km
    );
}

#[tokio::test]
async fn test_invalid_commands_leave_state_unchanged() {
    let t = common::spawn_test_tracker(&Config::test_default());

    assert_eq!(
        t.tracker.pause().await.unwrap_err(),
        SessionError::NoActiveSession
    );
    assert_eq!(
        t.tracker.stop().await.unwrap_err(),
        SessionError::NoActiveSession
    );

    t.tracker.start(WorkoutType::Cycle).await.unwrap();
    assert_eq!(
        t.tracker.start(WorkoutType::Run).await.unwrap_err(),
        SessionError::AlreadyActive
    );
    assert!(matches!(
        t.tracker.resume().await,
        Err(SessionError::InvalidTransition {
            from: SessionPhase::Running,
            ..
        })
    ));

    t.tracker.pause().await.unwrap();
    assert!(matches!(
        t.tracker.pause().await,
        Err(SessionError::InvalidTransition {
            from: SessionPhase::Paused,
            ..
        })
    ));

    let status = t.tracker.status().await.unwrap();
    assert_eq!(status.phase, SessionPhase::Paused);
    assert_eq!(status.snapshot.unwrap().workout_type, WorkoutType::Cycle);
}

#[tokio::test]
async fn test_failed_save_is_kept_for_retry() {
    let t = common::spawn_test_tracker(&Config::test_default());
    t.tracker.start(WorkoutType::Hike).await.unwrap();
    t.clock.advance_secs(10 * 60);

    t.db.set_fail_appends(true);
    let id = match t.tracker.stop().await {
        Err(SessionError::Persistence { id, .. }) => id,
        other => panic!("expected persistence error, got {:?}", other),
    };

    // Session ended and resources released even though the save failed
    let status = t.tracker.status().await.unwrap();
    assert_eq!(status.phase, SessionPhase::Stopped);
    assert_eq!(status.pending_record_id.as_deref(), Some(id.as_str()));
    assert!(!t.feed.is_subscribed());
    assert!(t.db.is_empty());
    assert!(!t.presenter.notices().is_empty());

    assert_eq!(
        t.tracker.start(WorkoutType::Walk).await.unwrap_err(),
        SessionError::UnsavedWorkout { id: id.clone() }
    );

    // Still offline: retry fails and the record stays pending
    assert!(matches!(
        t.tracker.retry_save().await,
        Err(SessionError::Persistence { .. })
    ));

    t.db.set_fail_appends(false);
    let record = t.tracker.retry_save().await.unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.duration_minutes, 10);
    assert_eq!(t.db.len(), 1);

    assert_eq!(
        t.tracker.retry_save().await.unwrap_err(),
        SessionError::NothingToRetry
    );
    t.tracker.start(WorkoutType::Walk).await.unwrap();
}

#[tokio::test]
async fn test_permission_denied_at_start() {
    let t = common::spawn_test_tracker(&Config::test_default());
    t.feed.set_permission(false);

    assert_eq!(
        t.tracker.start(WorkoutType::Run).await.unwrap_err(),
        SessionError::PermissionDenied
    );

    let status = t.tracker.status().await.unwrap();
    assert!(!status.active);
    assert!(status.last_notice.is_some());
    assert!(t.db.is_empty());
    assert_eq!(t.presenter.notices().len(), 1);

    t.feed.set_permission(true);
    t.tracker.start(WorkoutType::Run).await.unwrap();
    assert!(t.tracker.status().await.unwrap().active);
}

#[tokio::test]
async fn test_permission_revoked_mid_session() {
    let t = common::spawn_test_tracker(&Config::test_default());
    t.tracker.start(WorkoutType::Walk).await.unwrap();
    t.feed.push_fix(fix_at(0.0, 0.0, 0)).unwrap();

    t.feed.set_permission(false);

    let status = t.tracker.status().await.unwrap();
    assert_eq!(status.phase, SessionPhase::Stopped);
    assert!(!status.active);
    assert!(status.last_notice.unwrap().contains("revoked"));

    assert_eq!(
        t.tracker.stop().await.unwrap_err(),
        SessionError::NoActiveSession
    );
    assert!(t.db.is_empty());
}

#[tokio::test]
async fn test_revocation_with_full_feed_buffer_discards_workout() {
    let config = Config {
        feed_capacity: 1,
        ..Config::test_default()
    };
    let t = common::spawn_test_tracker(&config);
    t.tracker.start(WorkoutType::Walk).await.unwrap();

    // Buffer is full, so the revocation event itself cannot be queued
    t.feed.push_fix(fix_at(0.0, 0.0, 0)).unwrap();
    t.feed.set_permission(false);

    let status = t.tracker.status().await.unwrap();
    assert_eq!(status.phase, SessionPhase::Stopped);
    assert!(!status.active);
    assert!(status.last_notice.is_some());
    assert_eq!(t.presenter.notices().len(), 1);

    assert_eq!(
        t.tracker.stop().await.unwrap_err(),
        SessionError::NoActiveSession
    );
    assert!(t.db.is_empty());
}

/// Feed that can never deliver.
struct UnavailableFeed;

impl LocationFeed for UnavailableFeed {
    fn subscribe(&self) -> Result<mpsc::Receiver<FeedEvent>, FeedError> {
        Err(FeedError::Full)
    }

    fn unsubscribe(&self) {}
}

#[tokio::test]
async fn test_feed_failure_is_not_reported_as_permission() {
    let db = fittrack::db::MemoryDb::new();
    let presenter = Arc::new(common::RecordingPresenter::default());
    let tracker = TrackerHandle::spawn(
        Config::test_default().tracker_config(),
        TrackerDeps {
            clock: Arc::new(ManualClock::new(common::base_time())),
            feed: Arc::new(UnavailableFeed),
            history: Arc::new(db.clone()),
            profiles: Arc::new(db.clone()),
            presenter: presenter.clone(),
        },
    );

    assert!(matches!(
        tracker.start(WorkoutType::Run).await,
        Err(SessionError::FeedUnavailable(_))
    ));
    let status = tracker.status().await.unwrap();
    assert!(!status.active);
    assert_eq!(presenter.notices().len(), 1);
    assert!(db.is_empty());
}

#[tokio::test]
async fn test_calories_use_profile_weight() {
    let t = common::spawn_test_tracker(&Config::test_default());
    t.db.save_profile(&UserProfile {
        weight_kg: 90.0,
        ..UserProfile::default()
    })
    .unwrap();

    t.tracker.start(WorkoutType::Cycle).await.unwrap();
    t.clock.advance_secs(60 * 60);
    let record = t.tracker.stop().await.unwrap();

    // 6.0 MET x 90 kg x 1 h
    assert_eq!(record.calories, 540);
}

#[tokio::test(start_paused = true)]
async fn test_tick_runs_only_while_active() {
    let t = common::spawn_test_tracker(&Config::test_default());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(t.presenter.presented_count(), 0);

    t.tracker.start(WorkoutType::Run).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert!(t.presenter.presented_count() >= 3);

    t.tracker.pause().await.unwrap();
    let while_paused = t.presenter.presented_count();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(t.presenter.presented_count() > while_paused);
    assert!(t.presenter.presented.lock().unwrap().last().unwrap().is_paused);

    t.tracker.stop().await.unwrap();
    let after_stop = t.presenter.presented_count();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(t.presenter.presented_count(), after_stop);
}

#[tokio::test]
async fn test_snapshot_watch_sees_latest() {
    let t = common::spawn_test_tracker(&Config::test_default());
    let mut rx = t.tracker.subscribe();
    assert!(t.tracker.latest().is_none());

    t.tracker.start(WorkoutType::Walk).await.unwrap();
    t.feed.push_fix(fix_at(0.0, 0.0, 0)).unwrap();
    t.feed.push_fix(fix_at(0.0001, 0.0, 1)).unwrap();

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.as_ref().is_some_and(|s| s.route_points == 2)),
    )
    .await
    .unwrap()
    .unwrap()
    .clone()
    .unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Running);

    t.tracker.stop().await.unwrap();
    assert!(t.tracker.latest().is_none());
}

#[tokio::test]
async fn test_dropping_handles_ends_tracker() {
    let t = common::spawn_test_tracker(&Config::test_default());
    t.tracker.start(WorkoutType::Walk).await.unwrap();
    assert!(t.feed.is_subscribed());

    let feed = t.feed.clone();
    let db = t.db.clone();
    drop(t);

    tokio::time::timeout(Duration::from_secs(5), async {
        while feed.is_subscribed() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert!(db.is_empty());
}
