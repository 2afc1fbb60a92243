// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitTrack API Server
//!
//! Hosts the workout tracker and exposes its controls and workout history
//! over HTTP.

use fittrack::{
    config::Config,
    db::SqliteDb,
    services::{
        daily::ActiveMinutesTracker, ChannelLocationFeed, SystemClock, TrackerDeps,
        TrackerHandle, TracingPresenter,
    },
    AppState,
};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting FitTrack API");

    // Open workout database
    let db = Arc::new(SqliteDb::open(&config.database_path)?);

    let feed = Arc::new(ChannelLocationFeed::new(config.feed_capacity));

    // Start the workout tracker
    let tracker = TrackerHandle::spawn(
        config.tracker_config(),
        TrackerDeps {
            clock: Arc::new(SystemClock),
            feed: feed.clone(),
            history: db.clone(),
            profiles: db.clone(),
            presenter: Arc::new(TracingPresenter),
        },
    );
    tracing::info!(
        tick_ms = config.tick_interval_ms,
        jump_threshold_m = config.jump_threshold_m,
        "Workout tracker started"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        tracker,
        history: db.clone(),
        profiles: db,
        feed,
        daily_activity: Mutex::new(ActiveMinutesTracker::new(chrono::Utc::now())),
    });

    // Build router
    let app = fittrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fittrack=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
