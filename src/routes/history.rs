// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout history routes.

use crate::error::{AppError, Result};
use crate::models::{HistoryStats, RoutePoint, WorkoutRecord, WorkoutType};
use crate::services::route::encode_route_polyline;
use crate::time_utils::{format_duration_minutes, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts))
        .route(
            "/api/workouts/{id}",
            get(get_workout).delete(delete_workout),
        )
        .route("/api/stats", get(get_stats))
}

/// History list entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub id: String,
    pub workout_type: WorkoutType,
    pub timestamp_ms: i64,
    pub started_at: String,
    pub duration_minutes: i64,
    /// e.g. "1h 5min"
    pub duration_text: String,
    pub distance_km: f32,
    pub calories: i32,
    pub route_points: usize,
    pub deleted: bool,
}

impl From<&WorkoutRecord> for WorkoutSummary {
    fn from(record: &WorkoutRecord) -> Self {
        Self {
            id: record.id.clone(),
            workout_type: record.workout_type,
            timestamp_ms: record.started_at.timestamp_millis(),
            started_at: format_utc_rfc3339(record.started_at),
            duration_minutes: record.duration_minutes,
            duration_text: format_duration_minutes(record.duration_minutes),
            distance_km: record.distance_km,
            calories: record.calories,
            route_points: record.route.len(),
            deleted: record.deleted,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    include_deleted: bool,
}

#[derive(Serialize)]
pub struct WorkoutsResponse {
    pub workouts: Vec<WorkoutSummary>,
    pub total: usize,
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WorkoutsResponse>> {
    let history = state.history.clone();
    let records = tokio::task::spawn_blocking(move || history.list_all()).await??;

    let workouts: Vec<WorkoutSummary> = records
        .iter()
        .filter(|r| query.include_deleted || !r.deleted)
        .map(WorkoutSummary::from)
        .collect();

    Ok(Json(WorkoutsResponse {
        total: workouts.len(),
        workouts,
    }))
}

/// Full workout with its route.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub summary: WorkoutSummary,
    pub route: Vec<RoutePoint>,
    /// Google polyline of the route, for map display
    pub polyline: String,
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutDetail>> {
    let history = state.history.clone();
    let lookup_id = id.clone();
    let record = tokio::task::spawn_blocking(move || history.get(&lookup_id))
        .await??
        .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

    let polyline = encode_route_polyline(&record.route)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    Ok(Json(WorkoutDetail {
        summary: WorkoutSummary::from(&record),
        route: record.route,
        polyline,
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Soft delete: the record stays in the store flagged as deleted.
async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let history = state.history.clone();
    let delete_id = id.clone();
    tokio::task::spawn_blocking(move || history.mark_deleted(&delete_id)).await??;
    tracing::info!(id = %id, "Workout marked deleted");

    Ok(Json(DeleteResponse { success: true }))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<HistoryStats>> {
    let history = state.history.clone();
    let records = tokio::task::spawn_blocking(move || history.list_all()).await??;
    Ok(Json(HistoryStats::from_records(&records)))
}
