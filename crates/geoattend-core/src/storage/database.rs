//! SQLite-based record store.
//!
//! Persists the per-user layout the evaluator and aggregator work
//! against: the profile (attendance threshold), the subject list, the
//! weekly schedule, and one day bucket per calendar date with the
//! attendance records embedded as a JSON array.
//!
//! Day buckets are written whole (read-modify-write, last-write-wins on
//! the record array). The evaluator's idempotency guard is the persisted
//! record flags, re-read fresh each tick, so a single writer per user is
//! assumed; concurrent writers to the same day can lose updates.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::{CoreError, DatabaseError, ValidationError};
use crate::record::{DayBucket, DayRecord};
use crate::schedule::{sort_slots, ScheduleSlot, SlotLocation, Weekday};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

/// SQLite database for profile, schedule, and attendance storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/geoattend/geoattend.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("geoattend.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path,
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS profile (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    min_attendance_percent INTEGER NOT NULL DEFAULT 75
                );

                CREATE TABLE IF NOT EXISTS subjects (
                    name TEXT PRIMARY KEY
                );

                CREATE TABLE IF NOT EXISTS schedule_slots (
                    id            TEXT PRIMARY KEY,
                    day           TEXT NOT NULL,
                    subject       TEXT NOT NULL,
                    from_time     TEXT NOT NULL,
                    to_time       TEXT NOT NULL,
                    location_name TEXT NOT NULL,
                    lat           REAL NOT NULL,
                    lng           REAL NOT NULL,
                    place_id      TEXT NOT NULL DEFAULT ''
                );

                CREATE TABLE IF NOT EXISTS day_buckets (
                    date    TEXT PRIMARY KEY,
                    records TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_slots_day ON schedule_slots(day);

                INSERT OR IGNORE INTO profile (id, min_attendance_percent) VALUES (1, 75);",
            )
            .map_err(DatabaseError::from)
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// The configured minimum attendance percentage (default 75).
    pub fn min_attendance_percent(&self) -> Result<u8, DatabaseError> {
        let pct: i64 = self
            .conn
            .query_row(
                "SELECT min_attendance_percent FROM profile WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .map_err(DatabaseError::from)?;
        Ok(pct.clamp(0, 100) as u8)
    }

    /// Set the minimum attendance percentage (0-100).
    pub fn set_min_attendance_percent(&self, percent: u8) -> Result<(), CoreError> {
        if percent > 100 {
            return Err(ValidationError::OutOfRange {
                field: "min_attendance_percent",
                message: format!("{percent} is not between 0 and 100"),
            }
            .into());
        }
        self.conn
            .execute(
                "UPDATE profile SET min_attendance_percent = ?1 WHERE id = 1",
                params![percent],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    // ── Subjects ─────────────────────────────────────────────────────

    /// Add a subject. Returns false if it already exists.
    pub fn add_subject(&self, name: &str) -> Result<bool, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("subject").into());
        }
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO subjects (name) VALUES (?1)",
                params![name],
            )
            .map_err(DatabaseError::from)?;
        Ok(inserted > 0)
    }

    /// Remove a subject. Returns false if it was not present.
    pub fn remove_subject(&self, name: &str) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM subjects WHERE name = ?1", params![name])?;
        Ok(deleted > 0)
    }

    pub fn subjects(&self) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM subjects ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ── Schedule slots ───────────────────────────────────────────────

    pub fn add_slot(&self, slot: &ScheduleSlot) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO schedule_slots
                (id, day, subject, from_time, to_time, location_name, lat, lng, place_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                slot.id,
                slot.day.as_str(),
                slot.subject,
                slot.from_time.format(TIME_FMT).to_string(),
                slot.to_time.format(TIME_FMT).to_string(),
                slot.location.name,
                slot.location.lat,
                slot.location.lng,
                slot.location.place_id,
            ],
        )?;
        Ok(())
    }

    /// Delete a slot by id. Returns false if it was not present.
    /// Existing attendance records keep their denormalized copies.
    pub fn remove_slot(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM schedule_slots WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// All slots, sorted by day of week then start time.
    pub fn slots(&self) -> Result<Vec<ScheduleSlot>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, day, subject, from_time, to_time, location_name, lat, lng, place_id
             FROM schedule_slots",
        )?;
        let rows = stmt.query_map([], row_to_slot)?;
        let mut slots = Vec::new();
        for row in rows {
            slots.push(row?);
        }
        sort_slots(&mut slots);
        Ok(slots)
    }

    /// Slots recurring on the given weekday, sorted by start time.
    pub fn slots_for_day(&self, day: Weekday) -> Result<Vec<ScheduleSlot>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, day, subject, from_time, to_time, location_name, lat, lng, place_id
             FROM schedule_slots WHERE day = ?1",
        )?;
        let rows = stmt.query_map(params![day.as_str()], row_to_slot)?;
        let mut slots = Vec::new();
        for row in rows {
            slots.push(row?);
        }
        slots.sort_by(|a, b| a.from_time.cmp(&b.from_time));
        Ok(slots)
    }

    // ── Day buckets ──────────────────────────────────────────────────

    /// The bucket for a date, if any record has ever been written.
    pub fn day_bucket(&self, date: NaiveDate) -> Result<Option<DayBucket>, DatabaseError> {
        let key = date.format(DATE_FMT).to_string();
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT records FROM day_buckets WHERE date = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            None => Ok(None),
            Some(json) => {
                let records: Vec<DayRecord> = serde_json::from_str(&json).map_err(|e| {
                    DatabaseError::CorruptedBucket {
                        date: key,
                        message: e.to_string(),
                    }
                })?;
                Ok(Some(DayBucket { date, records }))
            }
        }
    }

    /// The bucket for a date, created empty (in memory) when absent.
    pub fn day_bucket_or_empty(&self, date: NaiveDate) -> Result<DayBucket, DatabaseError> {
        Ok(self.day_bucket(date)?.unwrap_or_else(|| DayBucket::empty(date)))
    }

    /// Write a bucket whole. Creates the row lazily on first write.
    pub fn put_day_bucket(&self, bucket: &DayBucket) -> Result<(), DatabaseError> {
        let key = bucket.date.format(DATE_FMT).to_string();
        let json = serde_json::to_string(&bucket.records).map_err(|e| {
            DatabaseError::QueryFailed(format!("encode day bucket: {e}"))
        })?;
        self.conn.execute(
            "INSERT OR REPLACE INTO day_buckets (date, records) VALUES (?1, ?2)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Buckets whose date starts with the given prefix (e.g. "2026-08"),
    /// in date order. This is the month-scan primitive.
    pub fn buckets_with_prefix(&self, prefix: &str) -> Result<Vec<DayBucket>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, records FROM day_buckets WHERE date LIKE ?1 || '%' ORDER BY date",
        )?;
        let rows = stmt.query_map(params![prefix], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut buckets = Vec::new();
        for row in rows {
            let (key, json) = row?;
            let date = NaiveDate::parse_from_str(&key, DATE_FMT).map_err(|e| {
                DatabaseError::CorruptedBucket {
                    date: key.clone(),
                    message: e.to_string(),
                }
            })?;
            let records: Vec<DayRecord> = serde_json::from_str(&json).map_err(|e| {
                DatabaseError::CorruptedBucket {
                    date: key,
                    message: e.to_string(),
                }
            })?;
            buckets.push(DayBucket { date, records });
        }
        Ok(buckets)
    }

    // ── Manual overrides ─────────────────────────────────────────────

    /// Flip the user-facing status for (date, slot). Silent no-op
    /// (returns false) when no decision record exists.
    pub fn toggle_status(&self, date: NaiveDate, slot_id: &str) -> Result<bool, DatabaseError> {
        let Some(mut bucket) = self.day_bucket(date)? else {
            return Ok(false);
        };
        if !bucket.toggle_status(slot_id) {
            return Ok(false);
        }
        self.put_day_bucket(&bucket)?;
        Ok(true)
    }

    /// Flip the exclusion flag for (date, slot). Silent no-op (returns
    /// false) when no decision record exists.
    pub fn toggle_do_not_consider(
        &self,
        date: NaiveDate,
        slot_id: &str,
    ) -> Result<bool, DatabaseError> {
        let Some(mut bucket) = self.day_bucket(date)? else {
            return Ok(false);
        };
        if !bucket.toggle_do_not_consider(slot_id) {
            return Ok(false);
        }
        self.put_day_bucket(&bucket)?;
        Ok(true)
    }
}

fn row_to_slot(row: &rusqlite::Row) -> Result<ScheduleSlot, rusqlite::Error> {
    let day_str: String = row.get(1)?;
    let day = Weekday::parse(&day_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown weekday '{day_str}'").into(),
        )
    })?;

    let from_str: String = row.get(3)?;
    let to_str: String = row.get(4)?;
    let parse_time = |idx: usize, s: &str| {
        NaiveTime::parse_from_str(s, TIME_FMT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                e.to_string().into(),
            )
        })
    };

    Ok(ScheduleSlot {
        id: row.get(0)?,
        day,
        subject: row.get(2)?,
        from_time: parse_time(3, &from_str)?,
        to_time: parse_time(4, &to_str)?,
        location: SlotLocation {
            name: row.get(5)?,
            lat: row.get(6)?,
            lng: row.get(7)?,
            place_id: row.get(8)?,
        },
    })
}
