// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - workout tracking logic.

pub mod calories;
pub mod daily;
pub mod feed;
pub mod notify;
pub mod route;
pub mod session;
pub mod timing;
pub mod tracker;

pub use feed::{ChannelLocationFeed, FeedError, FeedEvent, LocationFeed};
pub use notify::{NotificationPresenter, TracingPresenter};
pub use route::{FixOutcome, RouteAccumulator};
pub use session::{SessionError, WorkoutSession};
pub use timing::{ClockSource, ManualClock, SystemClock};
pub use tracker::{TrackerConfig, TrackerDeps, TrackerHandle, TrackerStatus};
