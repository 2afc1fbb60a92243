// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for tests and ephemeral runs.

use crate::db::{sort_newest_first, ProfileStore, StoreError, WorkoutHistoryStore};
use crate::models::{UserProfile, WorkoutRecord};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// `DashMap`-backed history; appends and soft deletes touch independent
/// entries and may run concurrently.
#[derive(Clone, Default)]
pub struct MemoryDb {
    records: Arc<DashMap<String, WorkoutRecord>>,
    profile: Arc<RwLock<UserProfile>>,
    fail_appends: Arc<AtomicBool>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail (offline simulation).
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl WorkoutHistoryStore for MemoryDb {
    fn append(&self, record: &WorkoutRecord) -> Result<String, StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Database("Database not available (offline mode)".to_string()));
        }

        self.records
            .entry(record.id.clone())
            .or_insert_with(|| record.clone());
        Ok(record.id.clone())
    }

    fn mark_deleted(&self, id: &str) -> Result<(), StoreError> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.deleted = true;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<WorkoutRecord>, StoreError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    fn list_all(&self) -> Result<Vec<WorkoutRecord>, StoreError> {
        let mut records: Vec<WorkoutRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

impl ProfileStore for MemoryDb {
    fn profile(&self) -> Result<UserProfile, StoreError> {
        Ok(self
            .profile
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        *self.profile.write().unwrap_or_else(|e| e.into_inner()) = profile.clone();
        Ok(())
    }
}
