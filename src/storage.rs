//! Storage collaborators
//!
//! The calculation modules never touch persistence directly. Everything they
//! need from the outside world goes through the traits below, which the host
//! application implements over whatever store it uses. Two implementations
//! ship with the crate: [`MemoryStore`] for tests and embedding, and
//! [`Database`], a SQLite store that keeps each record as a JSON document.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{HealthMetrics, RawHealthSample, Routine, WorkoutSession};

/// Append-only log of finished workout sessions
pub trait SessionLog {
    /// All sessions, in no particular order
    fn load_all_sessions(&self) -> Result<Vec<WorkoutSession>, StorageError>;

    /// Append a finished session. Sessions are never updated afterwards.
    fn append_session(&self, session: &WorkoutSession) -> Result<(), StorageError>;

    /// Sessions started from the given routine
    fn sessions_for_routine(&self, routine_id: &str) -> Result<Vec<WorkoutSession>, StorageError> {
        Ok(self
            .load_all_sessions()?
            .into_iter()
            .filter(|s| s.routine_id == routine_id)
            .collect())
    }
}

/// Routine table
pub trait RoutineStore {
    fn get_routine(&self, id: &str) -> Result<Routine, StorageError>;

    fn list_routines(&self) -> Result<Vec<Routine>, StorageError>;

    /// Insert or replace a routine
    fn save_routine(&self, routine: &Routine) -> Result<(), StorageError>;

    fn set_current_day_index(&self, id: &str, index: usize) -> Result<(), StorageError>;
}

/// Per-date cache of computed health metrics
pub trait HealthMetricsCache {
    fn get_metrics(&self, date: NaiveDate) -> Result<Option<HealthMetrics>, StorageError>;

    fn put_metrics(&self, date: NaiveDate, metrics: &HealthMetrics) -> Result<(), StorageError>;
}

/// Source of raw daily physiological samples (wearable, health platform)
///
/// Unavailable data is reported as missing fields, never as an error.
pub trait RawHealthSource {
    fn fetch_raw_sample(&self, date: NaiveDate) -> RawHealthSample;
}

/// Health source for hosts without any health data; every field is missing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHealthData;

impl RawHealthSource for NoHealthData {
    fn fetch_raw_sample(&self, _date: NaiveDate) -> RawHealthSample {
        RawHealthSample::default()
    }
}

/// Health source backed by a fixed set of samples
#[derive(Debug, Clone, Default)]
pub struct StaticHealthSource {
    samples: HashMap<NaiveDate, RawHealthSample>,
}

impl StaticHealthSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, sample: RawHealthSample) {
        self.samples.insert(date, sample);
    }

    pub fn from_samples(samples: impl IntoIterator<Item = (NaiveDate, RawHealthSample)>) -> Self {
        StaticHealthSource {
            samples: samples.into_iter().collect(),
        }
    }
}

impl RawHealthSource for StaticHealthSource {
    fn fetch_raw_sample(&self, date: NaiveDate) -> RawHealthSample {
        self.samples.get(&date).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: Vec<WorkoutSession>,
    routines: Vec<Routine>,
    metrics: BTreeMap<NaiveDate, HealthMetrics>,
}

/// In-process store implementing every collaborator trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state.lock().map_err(|e| StorageError::Unavailable {
            reason: e.to_string(),
        })
    }

    /// Number of `put_metrics` results currently cached
    pub fn cached_metrics_count(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.metrics.len())
    }
}

impl SessionLog for MemoryStore {
    fn load_all_sessions(&self) -> Result<Vec<WorkoutSession>, StorageError> {
        Ok(self.lock()?.sessions.clone())
    }

    fn append_session(&self, session: &WorkoutSession) -> Result<(), StorageError> {
        self.lock()?.sessions.push(session.clone());
        Ok(())
    }
}

impl RoutineStore for MemoryStore {
    fn get_routine(&self, id: &str) -> Result<Routine, StorageError> {
        self.lock()?
            .routines
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                table: "routines".to_string(),
                id: id.to_string(),
            })
    }

    fn list_routines(&self) -> Result<Vec<Routine>, StorageError> {
        Ok(self.lock()?.routines.clone())
    }

    fn save_routine(&self, routine: &Routine) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        match state.routines.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => *existing = routine.clone(),
            // Newest routines are listed first
            None => state.routines.insert(0, routine.clone()),
        }
        Ok(())
    }

    fn set_current_day_index(&self, id: &str, index: usize) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let routine = state
            .routines
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound {
                table: "routines".to_string(),
                id: id.to_string(),
            })?;
        routine.current_day_index = index;
        Ok(())
    }
}

impl HealthMetricsCache for MemoryStore {
    fn get_metrics(&self, date: NaiveDate) -> Result<Option<HealthMetrics>, StorageError> {
        Ok(self.lock()?.metrics.get(&date).cloned())
    }

    fn put_metrics(&self, date: NaiveDate, metrics: &HealthMetrics) -> Result<(), StorageError> {
        self.lock()?.metrics.insert(date, metrics.clone());
        Ok(())
    }
}

/// SQLite-backed store
///
/// Records are kept as JSON documents alongside the columns used for lookup.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create or open a database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema with tables and indexes
    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                routine_id TEXT NOT NULL,
                start_date DATE NOT NULL,
                document TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS routines (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                current_day_index INTEGER NOT NULL DEFAULT 0,
                document TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS health_metrics (
                date DATE PRIMARY KEY,
                document TEXT NOT NULL,
                last_calculated DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_routine ON workout_sessions (routine_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_date ON workout_sessions (start_date);
            "#,
        )?;

        Ok(())
    }

    fn routine_from_parts(
        document: String,
        current_day_index: i64,
    ) -> Result<Routine, StorageError> {
        let mut routine: Routine = serde_json::from_str(&document)?;
        // The column is authoritative; progression only touches the column
        routine.current_day_index = current_day_index.max(0) as usize;
        Ok(routine)
    }
}

impl SessionLog for Database {
    fn load_all_sessions(&self) -> Result<Vec<WorkoutSession>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT document FROM workout_sessions ORDER BY start_date, created_at")?;
        let documents = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut sessions = Vec::new();
        for document in documents {
            sessions.push(serde_json::from_str(&document?)?);
        }
        Ok(sessions)
    }

    fn append_session(&self, session: &WorkoutSession) -> Result<(), StorageError> {
        let document = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT INTO workout_sessions (id, routine_id, start_date, document)
             VALUES (?1, ?2, ?3, ?4)",
            params![session.id, session.routine_id, session.date().to_string(), document],
        )?;

        debug!(session = %session.id, routine = %session.routine_id, "Session appended");
        Ok(())
    }

    fn sessions_for_routine(&self, routine_id: &str) -> Result<Vec<WorkoutSession>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT document FROM workout_sessions
             WHERE routine_id = ?1
             ORDER BY start_date, created_at",
        )?;
        let documents = stmt.query_map(params![routine_id], |row| row.get::<_, String>(0))?;

        let mut sessions = Vec::new();
        for document in documents {
            sessions.push(serde_json::from_str(&document?)?);
        }
        Ok(sessions)
    }
}

impl RoutineStore for Database {
    fn get_routine(&self, id: &str) -> Result<Routine, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT document, current_day_index FROM routines WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            Some((document, index)) => Self::routine_from_parts(document, index),
            None => Err(StorageError::NotFound {
                table: "routines".to_string(),
                id: id.to_string(),
            }),
        }
    }

    fn list_routines(&self) -> Result<Vec<Routine>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT document, current_day_index FROM routines ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut routines = Vec::new();
        for row in rows {
            let (document, index) = row?;
            routines.push(Self::routine_from_parts(document, index)?);
        }
        Ok(routines)
    }

    fn save_routine(&self, routine: &Routine) -> Result<(), StorageError> {
        let document = serde_json::to_string(routine)?;
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO routines
                (id, name, current_day_index, document, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
            "#,
            params![
                routine.id,
                routine.name,
                routine.current_day_index as i64,
                document,
                routine.created_at.to_rfc3339(),
            ],
        )?;

        info!(routine = %routine.id, days = routine.days.len(), "Routine saved");
        Ok(())
    }

    fn set_current_day_index(&self, id: &str, index: usize) -> Result<(), StorageError> {
        let updated = self.conn.execute(
            "UPDATE routines
             SET current_day_index = ?1, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?2",
            params![index as i64, id],
        )?;

        if updated == 0 {
            return Err(StorageError::NotFound {
                table: "routines".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl HealthMetricsCache for Database {
    fn get_metrics(&self, date: NaiveDate) -> Result<Option<HealthMetrics>, StorageError> {
        let document = self
            .conn
            .query_row(
                "SELECT document FROM health_metrics WHERE date = ?1",
                params![date.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    fn put_metrics(&self, date: NaiveDate, metrics: &HealthMetrics) -> Result<(), StorageError> {
        let document = serde_json::to_string(metrics)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO health_metrics (date, document, last_calculated)
             VALUES (?1, ?2, ?3)",
            params![date.to_string(), document, metrics.last_calculated.to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, RoutineDay, WeightUnit};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn create_test_routine(id: &str) -> Routine {
        Routine {
            id: id.to_string(),
            name: "Upper Lower".to_string(),
            days: vec![
                RoutineDay {
                    id: "upper".to_string(),
                    day_number: 1,
                    name: "Upper".to_string(),
                    exercises: vec![Exercise {
                        id: "bench".to_string(),
                        name: "Bench Press".to_string(),
                        sets: 3,
                        rest_time: Some(120),
                        notes: None,
                    }],
                },
                RoutineDay {
                    id: "lower".to_string(),
                    day_number: 2,
                    name: "Lower".to_string(),
                    exercises: vec![Exercise {
                        id: "squat".to_string(),
                        name: "Squat".to_string(),
                        sets: 3,
                        rest_time: None,
                        notes: None,
                    }],
                },
            ],
            current_day_index: 0,
            progressive_overload_percentage: 2.0,
            created_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            notes: None,
            image_url: None,
        }
    }

    fn create_test_session(id: &str, routine_id: &str) -> WorkoutSession {
        WorkoutSession {
            id: id.to_string(),
            routine_id: routine_id.to_string(),
            routine_name: "Upper Lower".to_string(),
            day_id: "upper".to_string(),
            day_name: "Upper".to_string(),
            exercises: Vec::new(),
            start_time: Utc.with_ymd_and_hms(2024, 9, 2, 18, 0, 0).unwrap(),
            end_time: None,
            total_volume: 1200.0,
            total_sets: 6,
            duration_seconds: 2700,
            weight_unit: WeightUnit::Kg,
            notes: None,
            ai_feedback: None,
        }
    }

    #[test]
    fn test_memory_routine_store() {
        let store = MemoryStore::new();
        store.save_routine(&create_test_routine("r1")).unwrap();
        store.save_routine(&create_test_routine("r2")).unwrap();

        assert_eq!(store.list_routines().unwrap()[0].id, "r2");

        store.set_current_day_index("r1", 1).unwrap();
        assert_eq!(store.get_routine("r1").unwrap().current_day_index, 1);

        assert!(matches!(
            store.get_routine("missing"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(store.set_current_day_index("missing", 0).is_err());
    }

    #[test]
    fn test_memory_session_log() {
        let store = MemoryStore::new();
        store.append_session(&create_test_session("s1", "r1")).unwrap();
        store.append_session(&create_test_session("s2", "r2")).unwrap();

        assert_eq!(store.load_all_sessions().unwrap().len(), 2);
        let for_r1 = store.sessions_for_routine("r1").unwrap();
        assert_eq!(for_r1.len(), 1);
        assert_eq!(for_r1[0].id, "s1");
    }

    #[test]
    fn test_static_health_source() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let source = StaticHealthSource::from_samples([(
            date,
            RawHealthSample {
                sleep_hours: Some(7.5),
                ..RawHealthSample::default()
            },
        )]);

        assert_eq!(source.fetch_raw_sample(date).sleep_hours, Some(7.5));
        assert_eq!(source.fetch_raw_sample(date.succ_opt().unwrap()), RawHealthSample::default());
        assert_eq!(NoHealthData.fetch_raw_sample(date), RawHealthSample::default());
    }

    #[test]
    fn test_database_round_trip() {
        let temp_dir = tempdir().unwrap();
        let db = Database::new(temp_dir.path().join("liftrs.db")).unwrap();

        db.save_routine(&create_test_routine("r1")).unwrap();
        db.set_current_day_index("r1", 1).unwrap();
        let routine = db.get_routine("r1").unwrap();
        assert_eq!(routine.current_day_index, 1);
        assert_eq!(routine.days.len(), 2);

        db.append_session(&create_test_session("s1", "r1")).unwrap();
        db.append_session(&create_test_session("s2", "r2")).unwrap();
        assert_eq!(db.load_all_sessions().unwrap().len(), 2);
        assert_eq!(db.sessions_for_routine("r1").unwrap()[0].id, "s1");

        // Appending the same session twice is rejected
        assert!(db.append_session(&create_test_session("s1", "r1")).is_err());
    }

    #[test]
    fn test_database_missing_routine() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(db.get_routine("nope"), Err(StorageError::NotFound { .. })));
        assert!(matches!(
            db.set_current_day_index("nope", 1),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_database_health_cache() {
        let db = Database::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert!(db.get_metrics(date).unwrap().is_none());

        let metrics = HealthMetrics {
            date,
            calories_burned: 500.0,
            calories_consumed: 2200.0,
            sleep_hours: 7.0,
            sleep_percentage: 88,
            hrv: 60.0,
            resting_heart_rate: 55.0,
            stress_score: 40,
            recovery_score: 70,
            exertion_score: 4.5,
            energy_balance: 1700.0,
            last_calculated: Utc.with_ymd_and_hms(2024, 9, 2, 20, 0, 0).unwrap(),
        };
        db.put_metrics(date, &metrics).unwrap();

        assert_eq!(db.get_metrics(date).unwrap(), Some(metrics));
    }
}
