// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: workout history and user profile.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryDb;
pub use sqlite::SqliteDb;

use crate::models::{UserProfile, WorkoutRecord};

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Workout not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Append-mostly log of finalized workouts.
///
/// Implementations are blocking; async callers go through `spawn_blocking`.
pub trait WorkoutHistoryStore: Send + Sync {
    /// Persist a record atomically and return its id.
    ///
    /// Appending an id that is already stored is a no-op, so a failed append
    /// can be retried with the same record.
    fn append(&self, record: &WorkoutRecord) -> Result<String, StoreError>;

    /// Soft delete. The record keeps its id and stays readable.
    fn mark_deleted(&self, id: &str) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Option<WorkoutRecord>, StoreError>;

    /// All records newest first, deleted ones included.
    fn list_all(&self) -> Result<Vec<WorkoutRecord>, StoreError>;
}

/// User profile storage.
pub trait ProfileStore: Send + Sync {
    /// Stored profile, or the defaults when none was saved.
    fn profile(&self) -> Result<UserProfile, StoreError>;

    fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    fn body_weight_kg(&self) -> Result<f64, StoreError> {
        Ok(self.profile()?.weight_kg)
    }
}

/// Newest first, ties broken by id for a stable order.
pub(crate) fn sort_newest_first(records: &mut [WorkoutRecord]) {
    records.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
