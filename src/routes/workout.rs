// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout lifecycle controls and the location feed inlet.

use crate::error::{AppError, Result};
use crate::models::{LocationFix, WorkoutRecord, WorkoutType};
use crate::services::TrackerStatus;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workout/start", post(start_workout))
        .route("/api/workout/pause", post(pause_workout))
        .route("/api/workout/resume", post(resume_workout))
        .route("/api/workout/stop", post(stop_workout))
        .route("/api/workout/retry-save", post(retry_save))
        .route("/api/workout/status", get(get_status))
        .route("/api/location", post(push_location))
        .route("/api/location/permission", put(set_permission))
}

// ─── Lifecycle ───────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest {
    workout_type: String,
}

async fn start_workout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> Result<Json<TrackerStatus>> {
    let workout_type: WorkoutType = req
        .workout_type
        .parse()
        .map_err(|e: crate::models::WorkoutTypeParseError| AppError::BadRequest(e.to_string()))?;

    state.tracker.start(workout_type).await?;
    tracing::info!(workout_type = %workout_type, "Workout started");

    Ok(Json(state.tracker.status().await?))
}

async fn pause_workout(State(state): State<Arc<AppState>>) -> Result<Json<TrackerStatus>> {
    state.tracker.pause().await?;
    Ok(Json(state.tracker.status().await?))
}

async fn resume_workout(State(state): State<Arc<AppState>>) -> Result<Json<TrackerStatus>> {
    state.tracker.resume().await?;
    Ok(Json(state.tracker.status().await?))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Result<Json<TrackerStatus>> {
    Ok(Json(state.tracker.status().await?))
}

/// Saved workout as returned by stop and retry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkoutResponse {
    pub id: String,
    pub workout_type: WorkoutType,
    pub started_at: String,
    pub duration_minutes: i64,
    pub distance_km: f32,
    pub calories: i32,
    pub route_points: usize,
}

impl From<&WorkoutRecord> for SavedWorkoutResponse {
    fn from(record: &WorkoutRecord) -> Self {
        Self {
            id: record.id.clone(),
            workout_type: record.workout_type,
            started_at: format_utc_rfc3339(record.started_at),
            duration_minutes: record.duration_minutes,
            distance_km: record.distance_km,
            calories: record.calories,
            route_points: record.route.len(),
        }
    }
}

async fn stop_workout(State(state): State<Arc<AppState>>) -> Result<Json<SavedWorkoutResponse>> {
    let record = state.tracker.stop().await?;
    tracing::info!(
        id = %record.id,
        duration_minutes = record.duration_minutes,
        distance_km = record.distance_km,
        calories = record.calories,
        "Workout stopped and saved"
    );
    Ok(Json(SavedWorkoutResponse::from(&record)))
}

async fn retry_save(State(state): State<Arc<AppState>>) -> Result<Json<SavedWorkoutResponse>> {
    let record = state.tracker.retry_save().await?;
    Ok(Json(SavedWorkoutResponse::from(&record)))
}

// ─── Location feed ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct LocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    longitude: f64,
    /// Capture time in epoch milliseconds; defaults to arrival time
    timestamp_ms: Option<i64>,
    #[validate(range(min = 0.0))]
    accuracy_m: Option<f32>,
}

#[derive(Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

async fn push_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LocationRequest>,
) -> Result<Json<AcceptedResponse>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let captured_at = match req.timestamp_ms {
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid timestamp {}", ms)))?,
        None => Utc::now(),
    };

    let fix = LocationFix {
        latitude: req.latitude,
        longitude: req.longitude,
        captured_at,
        accuracy_m: req.accuracy_m,
    };
    state.feed.push_fix(fix)?;

    Ok(Json(AcceptedResponse { accepted: true }))
}

#[derive(Deserialize, Serialize)]
pub struct PermissionRequest {
    pub granted: bool,
}

async fn set_permission(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PermissionRequest>,
) -> Json<PermissionRequest> {
    tracing::info!(granted = req.granted, "Location permission changed");
    state.feed.set_permission(req.granted);
    Json(PermissionRequest {
        granted: state.feed.permission_granted(),
    })
}
