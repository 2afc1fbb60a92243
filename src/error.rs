// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::services::{FeedError, SessionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Service busy: {0}")]
    Busy(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppError::NotFound(format!("Workout {} not found", id)),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::PermissionDenied => AppError::Session(SessionError::PermissionDenied),
            FeedError::NotSubscribed => AppError::Session(SessionError::NoActiveSession),
            FeedError::Full => AppError::Busy(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(anyhow::anyhow!("Blocking task failed: {}", e))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// HTTP status, machine-readable code, and optional details.
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Session(err) => session_parts(err),
            AppError::Busy(msg) => (StatusCode::SERVICE_UNAVAILABLE, "busy", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        }
    }
}

fn session_parts(err: &SessionError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        SessionError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "invalid_transition", Some(err.to_string()))
        }
        SessionError::AlreadyActive => (StatusCode::CONFLICT, "already_active", None),
        SessionError::NoActiveSession => (StatusCode::CONFLICT, "no_active_session", None),
        SessionError::UnsavedWorkout { id } => {
            (StatusCode::CONFLICT, "unsaved_workout", Some(id.clone()))
        }
        SessionError::NothingToRetry => (StatusCode::CONFLICT, "nothing_to_retry", None),
        SessionError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied", None),
        SessionError::Persistence { id, reason } => {
            tracing::error!(id = %id, error = %reason, "Workout save failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_error",
                Some(id.clone()),
            )
        }
        SessionError::FeedUnavailable(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "feed_unavailable",
            Some(reason.clone()),
        ),
        SessionError::TrackerUnavailable => {
            tracing::error!("Workout tracker is not running");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "tracker_unavailable",
                None,
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
