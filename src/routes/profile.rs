// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and daily step estimate routes.

use crate::error::{AppError, Result};
use crate::models::{Gender, UserProfile};
use crate::services::{calories, daily};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/daily/estimate", get(daily_estimate))
        .route("/api/daily/steps", post(record_steps))
}

async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<UserProfile>> {
    let profiles = state.profiles.clone();
    let profile = tokio::task::spawn_blocking(move || profiles.profile()).await??;
    Ok(Json(profile))
}

/// Profile update. Weight feeds every calorie estimate, so bounds are strict.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub gender: Gender,
    #[validate(range(min = 1, max = 120))]
    pub age: u32,
    #[validate(range(min = 20.0, max = 400.0))]
    pub weight_kg: f64,
    #[validate(range(min = 50, max = 275))]
    pub height_cm: u32,
    #[validate(range(min = 1, max = 10000))]
    pub daily_calories_goal: u32,
    #[validate(range(min = 1, max = 100000))]
    pub daily_steps_goal: u32,
}

impl From<ProfileRequest> for UserProfile {
    fn from(req: ProfileRequest) -> Self {
        Self {
            gender: req.gender,
            age: req.age,
            weight_kg: req.weight_kg,
            height_cm: req.height_cm,
            daily_calories_goal: req.daily_calories_goal,
            daily_steps_goal: req.daily_steps_goal,
        }
    }
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<UserProfile>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = UserProfile::from(req);
    let profiles = state.profiles.clone();
    let saved = profile.clone();
    tokio::task::spawn_blocking(move || profiles.save_profile(&saved)).await??;
    tracing::info!(
        weight_kg = profile.weight_kg,
        height_cm = profile.height_cm,
        "Profile updated"
    );

    Ok(Json(profile))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyQuery {
    /// Defaults to the last recorded step count
    steps: Option<u32>,
    /// Defaults to the tracked active minutes
    active_minutes: Option<u32>,
}

/// Daily step-derived metrics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEstimate {
    pub steps: u32,
    pub active_minutes: u32,
    pub distance_km: f64,
    /// MET-based estimate from steps and active minutes
    pub calories: i32,
    /// Distance-based estimate (walking cost per km)
    pub calories_by_distance: i32,
    pub steps_goal_progress: f64,
}

impl DailyEstimate {
    fn new(steps: u32, active_minutes: u32, profile: &UserProfile) -> Self {
        let distance_km = daily::steps_to_distance_km(steps, profile.height_cm, profile.gender);
        let progress = if profile.daily_steps_goal > 0 {
            f64::from(steps) / f64::from(profile.daily_steps_goal)
        } else {
            0.0
        };

        Self {
            steps,
            active_minutes,
            distance_km,
            calories: daily::estimate_daily_calories(steps, active_minutes, profile),
            calories_by_distance: calories::estimate_by_distance(distance_km, profile.weight_kg),
            steps_goal_progress: progress,
        }
    }
}

async fn daily_estimate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailyEstimate>> {
    let profiles = state.profiles.clone();
    let profile = tokio::task::spawn_blocking(move || profiles.profile()).await??;

    let (tracked_steps, tracked_minutes) = {
        let activity = state
            .daily_activity
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        (activity.step_count(), activity.total_active_minutes())
    };

    Ok(Json(DailyEstimate::new(
        query.steps.unwrap_or(tracked_steps),
        query.active_minutes.unwrap_or(tracked_minutes),
        &profile,
    )))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepsRequest {
    /// Cumulative steps since the counter last restarted
    steps: u32,
    /// Sample time in epoch milliseconds; defaults to arrival time
    timestamp_ms: Option<i64>,
}

/// Record a step counter reading and return the updated daily metrics.
async fn record_steps(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepsRequest>,
) -> Result<Json<DailyEstimate>> {
    let now = match req.timestamp_ms {
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid timestamp {}", ms)))?,
        None => Utc::now(),
    };

    let active_minutes = state
        .daily_activity
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .record(req.steps, now);
    tracing::debug!(steps = req.steps, active_minutes, "Step count recorded");

    let profiles = state.profiles.clone();
    let profile = tokio::task::spawn_blocking(move || profiles.profile()).await??;

    Ok(Json(DailyEstimate::new(req.steps, active_minutes, &profile)))
}
