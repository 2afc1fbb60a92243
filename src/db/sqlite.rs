// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite-backed workout history and profile storage.
//!
//! A workout row and its route are written in one transaction, so an app
//! kill mid-write leaves either the whole record or nothing.

use crate::db::{ProfileStore, StoreError, WorkoutHistoryStore};
use crate::models::{RoutePoint, UserProfile, WorkoutRecord, WorkoutType};
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const PROFILE_KEY: &str = "user_profile";

/// SQLite database handle. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        tracing::info!(path, "Opened workout database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- Finalized workouts (append-only apart from the deleted flag)
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                workout_type TEXT NOT NULL,
                timestamp_ms INTEGER NOT NULL,
                duration_minutes INTEGER NOT NULL,
                distance_km REAL NOT NULL,
                calories INTEGER NOT NULL,
                deleted INTEGER NOT NULL DEFAULT 0
            );

            -- Raw GPS route per workout (JSON array of {lat, lon, timestampMs})
            CREATE TABLE IF NOT EXISTS workout_routes (
                workout_id TEXT PRIMARY KEY,
                route_json TEXT NOT NULL,
                point_count INTEGER NOT NULL,
                FOREIGN KEY (workout_id) REFERENCES workouts(id) ON DELETE CASCADE
            );

            -- Small key/value settings (user profile)
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workouts_timestamp ON workouts(timestamp_ms DESC);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
        Ok(RawRecord {
            id: row.get(0)?,
            workout_type: row.get(1)?,
            timestamp_ms: row.get(2)?,
            duration_minutes: row.get(3)?,
            distance_km: row.get(4)?,
            calories: row.get(5)?,
            deleted: row.get(6)?,
            route_json: row.get(7)?,
        })
    }
}

const SELECT_RECORD: &str = "SELECT w.id, w.workout_type, w.timestamp_ms, w.duration_minutes,
            w.distance_km, w.calories, w.deleted, r.route_json
     FROM workouts w LEFT JOIN workout_routes r ON r.workout_id = w.id";

/// Row as stored, before parsing the typed fields.
struct RawRecord {
    id: String,
    workout_type: String,
    timestamp_ms: i64,
    duration_minutes: i64,
    distance_km: f64,
    calories: i32,
    deleted: bool,
    route_json: Option<String>,
}

impl TryFrom<RawRecord> for WorkoutRecord {
    type Error = StoreError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let workout_type: WorkoutType = raw
            .workout_type
            .parse()
            .map_err(|e: crate::models::WorkoutTypeParseError| {
                StoreError::Serialization(e.to_string())
            })?;
        let started_at = DateTime::from_timestamp_millis(raw.timestamp_ms).ok_or_else(|| {
            StoreError::Serialization(format!("Invalid timestamp {}", raw.timestamp_ms))
        })?;
        let route: Vec<RoutePoint> = match raw.route_json {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        Ok(WorkoutRecord {
            id: raw.id,
            workout_type,
            started_at,
            duration_minutes: raw.duration_minutes,
            distance_km: raw.distance_km as f32,
            calories: raw.calories,
            route,
            deleted: raw.deleted,
        })
    }
}

impl WorkoutHistoryStore for SqliteDb {
    fn append(&self, record: &WorkoutRecord) -> Result<String, StoreError> {
        let route_json = serde_json::to_string(&record.route)?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO workouts
                (id, workout_type, timestamp_ms, duration_minutes, distance_km, calories, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.workout_type.label(),
                record.started_at.timestamp_millis(),
                record.duration_minutes,
                f64::from(record.distance_km),
                record.calories,
                record.deleted,
            ],
        )?;

        if inserted == 0 {
            tracing::info!(id = %record.id, "Workout already stored, skipping append");
            tx.commit()?;
            return Ok(record.id.clone());
        }

        tx.execute(
            "INSERT INTO workout_routes (workout_id, route_json, point_count) VALUES (?, ?, ?)",
            params![record.id, route_json, record.route.len() as i64],
        )?;
        tx.commit()?;

        tracing::info!(
            id = %record.id,
            points = record.route.len(),
            "Workout appended to history"
        );
        Ok(record.id.clone())
    }

    fn mark_deleted(&self, id: &str) -> Result<(), StoreError> {
        let updated = self
            .lock()
            .execute("UPDATE workouts SET deleted = 1 WHERE id = ?", params![id])?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<WorkoutRecord>, StoreError> {
        let raw = self
            .lock()
            .query_row(
                &format!("{SELECT_RECORD} WHERE w.id = ?"),
                params![id],
                Self::record_from_row,
            )
            .optional()?;
        raw.map(WorkoutRecord::try_from).transpose()
    }

    fn list_all(&self) -> Result<Vec<WorkoutRecord>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_RECORD} ORDER BY w.timestamp_ms DESC, w.id ASC"
        ))?;
        let rows = stmt
            .query_map([], Self::record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(WorkoutRecord::try_from).collect()
    }
}

impl ProfileStore for SqliteDb {
    fn profile(&self) -> Result<UserProfile, StoreError> {
        let json: Option<String> = self
            .lock()
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![PROFILE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(UserProfile::default()),
        }
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let json = serde_json::to_string(profile)?;
        self.lock().execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![PROFILE_KEY, json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_record(id: &str, offset_secs: i64) -> WorkoutRecord {
        let started_at = DateTime::from_timestamp_millis(1_700_000_000_250).unwrap()
            + Duration::seconds(offset_secs);
        WorkoutRecord {
            id: id.to_string(),
            workout_type: WorkoutType::Hike,
            started_at,
            duration_minutes: 95,
            distance_km: 7.25,
            calories: 633,
            route: vec![
                RoutePoint {
                    latitude: 37.32,
                    longitude: -122.09,
                    captured_at: started_at,
                },
                RoutePoint {
                    latitude: 37.3202,
                    longitude: -122.09,
                    captured_at: started_at + Duration::seconds(3),
                },
            ],
            deleted: false,
        }
    }

    #[test]
    fn test_append_and_get() {
        let db = SqliteDb::in_memory().unwrap();
        let record = make_record("w1", 0);

        assert_eq!(db.append(&record).unwrap(), "w1");
        assert_eq!(db.get("w1").unwrap(), Some(record));
        assert_eq!(db.get("missing").unwrap(), None);
    }

    #[test]
    fn test_append_same_id_twice_keeps_one() {
        let db = SqliteDb::in_memory().unwrap();
        let record = make_record("w1", 0);
        db.append(&record).unwrap();
        db.append(&record).unwrap();
        assert_eq!(db.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_list_order_and_soft_delete() {
        let db = SqliteDb::in_memory().unwrap();
        db.append(&make_record("older", 0)).unwrap();
        db.append(&make_record("newer", 60)).unwrap();
        db.mark_deleted("older").unwrap();

        let all = db.list_all().unwrap();
        assert_eq!(all[0].id, "newer");
        assert_eq!(all[1].id, "older");
        assert!(all[1].deleted);
        assert!(matches!(db.mark_deleted("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_profile_round_trip() {
        let db = SqliteDb::in_memory().unwrap();
        assert_eq!(db.profile().unwrap(), UserProfile::default());

        let profile = UserProfile {
            weight_kg: 64.0,
            height_cm: 168,
            ..UserProfile::default()
        };
        db.save_profile(&profile).unwrap();
        assert_eq!(db.profile().unwrap(), profile);
        assert_eq!(db.body_weight_kg().unwrap(), 64.0);
    }

    #[test]
    fn test_reopen_file_database() {
        let path = std::env::temp_dir().join(format!(
            "fittrack-test-{}.db",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let path_str = path.to_string_lossy().to_string();

        {
            let db = SqliteDb::open(&path_str).unwrap();
            db.append(&make_record("persisted", 0)).unwrap();
        }

        let db = SqliteDb::open(&path_str).unwrap();
        assert_eq!(db.list_all().unwrap().len(), 1);
        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
