//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Tracked habits
//! - Completion instants per habit
//!
//! Streak metrics are never stored; they are derived from completions by
//! the streak engine on every query.

use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::streak::StreakEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite database for habits and their completions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/momentum/momentum.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data dir is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("momentum.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS habits (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                habit_id     TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completions_habit ON completions(habit_id);",
        )?;
        Ok(())
    }

    // ── Habits ───────────────────────────────────────────────────────

    /// Create a habit and return it.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn add_habit(&self, name: &str) -> Result<Habit, DatabaseError> {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO habits (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![habit.id, habit.name, habit.created_at.to_rfc3339()],
        )?;
        Ok(habit)
    }

    pub fn list_habits(&self) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM habits ORDER BY created_at, name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut habits = Vec::new();
        for row in rows {
            let (id, name, created_at) = row?;
            habits.push(Habit {
                id,
                name,
                created_at: parse_instant(&created_at)?,
            });
        }
        Ok(habits)
    }

    /// Find a habit by exact id, or by unique id prefix.
    pub fn find_habit(&self, id_or_prefix: &str) -> Result<Option<Habit>, DatabaseError> {
        let mut matches: Vec<Habit> = self
            .list_habits()?
            .into_iter()
            .filter(|h| h.id.starts_with(id_or_prefix))
            .collect();
        if let Some(exact) = matches.iter().position(|h| h.id == id_or_prefix) {
            return Ok(Some(matches.swap_remove(exact)));
        }
        Ok(if matches.len() == 1 { matches.pop() } else { None })
    }

    fn require_habit(&self, id: &str) -> Result<(), DatabaseError> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM habits WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        exists.ok_or_else(|| DatabaseError::HabitNotFound(id.to_string()))
    }

    /// Delete a habit and its completions.
    ///
    /// # Errors
    /// Returns `HabitNotFound` if no habit has this id.
    pub fn remove_habit(&self, id: &str) -> Result<(), DatabaseError> {
        self.require_habit(id)?;
        self.conn
            .execute("DELETE FROM completions WHERE habit_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Completions ──────────────────────────────────────────────────

    /// Record that a habit was done at `at`.
    ///
    /// Several completions on one day are stored as-is; the streak engine
    /// collapses them.
    ///
    /// # Errors
    /// Returns `HabitNotFound` if no habit has this id.
    pub fn record_completion(&self, habit_id: &str, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.require_habit(habit_id)?;
        self.conn.execute(
            "INSERT INTO completions (habit_id, completed_at) VALUES (?1, ?2)",
            params![habit_id, at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn completions(&self, habit_id: &str) -> Result<Vec<DateTime<Utc>>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT completed_at FROM completions WHERE habit_id = ?1 ORDER BY completed_at",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_instant(&row?)?);
        }
        Ok(out)
    }

    /// Remove every completion that falls on `day` in the engine's calendar.
    ///
    /// Returns how many rows were deleted.
    pub fn remove_completions_on<Tz: TimeZone>(
        &self,
        habit_id: &str,
        day: NaiveDate,
        engine: &StreakEngine<Tz>,
    ) -> Result<usize, DatabaseError> {
        self.require_habit(habit_id)?;
        let mut removed = 0;
        for instant in self.completions(habit_id)? {
            if engine.normalize(instant) == day {
                removed += self.conn.execute(
                    "DELETE FROM completions WHERE habit_id = ?1 AND completed_at = ?2",
                    params![habit_id, instant.to_rfc3339()],
                )?;
            }
        }
        Ok(removed)
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn add_and_list_habits() {
        let db = Database::open_memory().unwrap();
        let read = db.add_habit("Read").unwrap();
        db.add_habit("Stretch").unwrap();

        let habits = db.list_habits().unwrap();
        assert_eq!(habits.len(), 2);
        assert!(habits.iter().any(|h| h.id == read.id && h.name == "Read"));
    }

    #[test]
    fn find_by_prefix() {
        let db = Database::open_memory().unwrap();
        let habit = db.add_habit("Read").unwrap();
        let found = db.find_habit(&habit.id[..8]).unwrap().unwrap();
        assert_eq!(found.id, habit.id);
        assert!(db.find_habit("zzzz-not-an-id").unwrap().is_none());
    }

    #[test]
    fn completions_round_trip() {
        let db = Database::open_memory().unwrap();
        let habit = db.add_habit("Run").unwrap();
        let t = Utc.with_ymd_and_hms(2024, 4, 2, 6, 30, 0).unwrap();
        db.record_completion(&habit.id, t).unwrap();
        db.record_completion(&habit.id, t - Duration::days(1)).unwrap();

        let all = db.completions(&habit.id).unwrap();
        assert_eq!(all, vec![t - Duration::days(1), t]);
    }

    #[test]
    fn completion_for_unknown_habit_fails() {
        let db = Database::open_memory().unwrap();
        let err = db.record_completion("missing", Utc::now()).unwrap_err();
        assert!(matches!(err, DatabaseError::HabitNotFound(_)));
    }

    #[test]
    fn remove_completions_on_day() {
        let db = Database::open_memory().unwrap();
        let habit = db.add_habit("Meditate").unwrap();
        let morning = Utc.with_ymd_and_hms(2024, 4, 2, 6, 0, 0).unwrap();
        db.record_completion(&habit.id, morning).unwrap();
        db.record_completion(&habit.id, morning + Duration::hours(10)).unwrap();
        db.record_completion(&habit.id, morning - Duration::days(1)).unwrap();

        let engine = StreakEngine::new(Utc);
        let removed = db
            .remove_completions_on(&habit.id, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(), &engine)
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.completions(&habit.id).unwrap().len(), 1);
    }

    #[test]
    fn remove_habit_drops_completions() {
        let db = Database::open_memory().unwrap();
        let habit = db.add_habit("Run").unwrap();
        db.record_completion(&habit.id, Utc::now()).unwrap();
        db.remove_habit(&habit.id).unwrap();
        assert!(db.list_habits().unwrap().is_empty());
        assert!(db.completions(&habit.id).unwrap().is_empty());
        assert!(db.remove_habit(&habit.id).is_err());
    }
}
