//! SQLite persistence for calendar events.
//!
//! Single `events` table keyed by case-insensitive event name. Dates are
//! stored as ISO-8601 text so `BETWEEN` range filters compare correctly.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{BotError, Result};
use crate::models::event::{Event, EventPatch};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS events (
    event_name TEXT NOT NULL,
    event_date TEXT NOT NULL,
    event_time TEXT NOT NULL,
    location TEXT,
    contact TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_events_name ON events(event_name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_events_date ON events(event_date);
";

const SELECT_COLUMNS: &str = "event_name, event_date, event_time, location, contact";

/// Owns the persisted event collection; all mutation goes through here.
pub struct EventStore {
    // `None` once `close()` has run; every operation checks first.
    conn: Option<Connection>,
    // Running total kept in sync by mutations so replies can report the new
    // count without a second query. `count()` recomputes and repairs drift.
    cached_count: i64,
}

impl EventStore {
    /// Open or create the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BotError::Validation(format!(
                        "Unable to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Self::from_connection(conn)
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let cached_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(Self {
            conn: Some(conn),
            cached_count,
        })
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(BotError::Closed)
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Result<Option<Event>> {
        let event = self
            .conn()?
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM events WHERE event_name = ?1 COLLATE NOCASE"),
                params![name],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }

    /// Insert a new event; returns the new total.
    pub fn create(&mut self, event: &Event) -> Result<usize> {
        if self.find(&event.name)?.is_some() {
            return Err(BotError::DuplicateName(event.name.clone()));
        }
        self.conn()?.execute(
            "INSERT INTO events (event_name, event_date, event_time, location, contact)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.name,
                event.date,
                event.time,
                event.location,
                event.contact
            ],
        )?;
        self.cached_count += 1;
        Ok(self.cached_count as usize)
    }

    /// Merge `patch` into the named event; returns the merged record.
    pub fn update(&mut self, name: &str, patch: &EventPatch) -> Result<Event> {
        let existing = self
            .find(name)?
            .ok_or_else(|| BotError::NotFound(name.to_string()))?;

        if let Some(new_name) = &patch.name {
            let renamed = !new_name.eq_ignore_ascii_case(&existing.name);
            if renamed && self.find(new_name)?.is_some() {
                return Err(BotError::DuplicateName(new_name.clone()));
            }
        }

        let merged = patch.apply(&existing);
        self.conn()?.execute(
            "UPDATE events
             SET event_name = ?1, event_date = ?2, event_time = ?3, location = ?4, contact = ?5
             WHERE event_name = ?6 COLLATE NOCASE",
            params![
                merged.name,
                merged.date,
                merged.time,
                merged.location,
                merged.contact,
                name
            ],
        )?;
        Ok(merged)
    }

    /// Remove the named event; returns the new total.
    pub fn delete(&mut self, name: &str) -> Result<usize> {
        let removed = self.conn()?.execute(
            "DELETE FROM events WHERE event_name = ?1 COLLATE NOCASE",
            params![name],
        )?;
        if removed == 0 {
            return Err(BotError::NotFound(name.to_string()));
        }
        self.cached_count -= removed as i64;
        Ok(self.cached_count.max(0) as usize)
    }

    /// Remove every event unconditionally.
    pub fn clear(&mut self) -> Result<()> {
        self.conn()?.execute("DELETE FROM events", [])?;
        self.cached_count = 0;
        Ok(())
    }

    /// All events, date ascending.
    pub fn list_all(&self) -> Result<Vec<Event>> {
        self.query_events(
            &format!("SELECT {SELECT_COLUMNS} FROM events ORDER BY event_date ASC"),
            params![],
        )
    }

    /// Events dated within `[start, end]`, date ascending.
    pub fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>> {
        self.query_events(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM events
                 WHERE event_date BETWEEN ?1 AND ?2
                 ORDER BY event_date ASC"
            ),
            params![start, end],
        )
    }

    /// Events whose contact field contains `needle` (case-insensitive),
    /// date ascending.
    pub fn list_by_contact(&self, needle: &str) -> Result<Vec<Event>> {
        self.query_events(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM events
                 WHERE instr(lower(contact), lower(?1)) > 0
                 ORDER BY event_date ASC"
            ),
            params![needle],
        )
    }

    /// Authoritative count, recomputed from the table. Also repairs the
    /// running counter if it drifted.
    pub fn count(&mut self) -> Result<usize> {
        let total: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        self.cached_count = total;
        Ok(total as usize)
    }

    /// Delete events dated strictly before `today`; returns how many were
    /// removed. Safe to call with zero matches.
    pub fn purge_past(&mut self, today: NaiveDate) -> Result<usize> {
        let removed = self
            .conn()?
            .execute("DELETE FROM events WHERE event_date < ?1", params![today])?;
        self.cached_count -= removed as i64;
        Ok(removed)
    }

    /// Release the SQLite connection. Subsequent operations fail with a
    /// closed-store error instead of panicking.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| BotError::Storage(err))?;
        }
        Ok(())
    }

    fn query_events(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Event>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    Ok(Event {
        name: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        location: row.get(3)?,
        contact: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, date: (i32, u32, u32), contact: &str) -> Event {
        Event {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: "9:00 AM".to_string(),
            location: None,
            contact: contact.to_string(),
        }
    }

    #[test]
    fn create_rejects_case_insensitive_duplicates() {
        let mut store = EventStore::in_memory().unwrap();
        store.create(&event("Meeting", (2030, 3, 1), "Alice")).unwrap();

        let err = store
            .create(&event("meeting", (2030, 3, 2), "Bob"))
            .unwrap_err();
        assert!(matches!(err, BotError::DuplicateName(_)));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn delete_missing_is_not_found_and_count_unchanged() {
        let mut store = EventStore::in_memory().unwrap();
        store.create(&event("Meeting", (2030, 3, 1), "Alice")).unwrap();

        let err = store.delete("Offsite").unwrap_err();
        assert!(matches!(err, BotError::NotFound(_)));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn delete_matches_case_insensitively() {
        let mut store = EventStore::in_memory().unwrap();
        store.create(&event("Meeting", (2030, 3, 1), "Alice")).unwrap();

        assert_eq!(store.delete("MEETING").unwrap(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let mut store = EventStore::in_memory().unwrap();
        let mut original = event("Standup", (2030, 1, 10), "Alice");
        original.location = Some("Room 2".to_string());
        store.create(&original).unwrap();

        let patch = EventPatch {
            date: Some(NaiveDate::from_ymd_opt(2030, 1, 17).unwrap()),
            ..EventPatch::default()
        };
        let merged = store.update("standup", &patch).unwrap();
        assert_eq!(merged.date, NaiveDate::from_ymd_opt(2030, 1, 17).unwrap());
        assert_eq!(merged.time, "9:00 AM");
        assert_eq!(merged.location.as_deref(), Some("Room 2"));
        assert_eq!(merged.contact, "Alice");

        let stored = store.find("Standup").unwrap().unwrap();
        assert_eq!(stored, merged);
    }

    #[test]
    fn update_rename_collision_is_duplicate() {
        let mut store = EventStore::in_memory().unwrap();
        store.create(&event("Standup", (2030, 1, 10), "Alice")).unwrap();
        store.create(&event("Retro", (2030, 1, 11), "Bob")).unwrap();

        let patch = EventPatch {
            name: Some("standup".to_string()),
            ..EventPatch::default()
        };
        let err = store.update("Retro", &patch).unwrap_err();
        assert!(matches!(err, BotError::DuplicateName(_)));
    }

    #[test]
    fn purge_past_is_idempotent() {
        let mut store = EventStore::in_memory().unwrap();
        store.create(&event("Old", (2020, 1, 1), "Alice")).unwrap();
        store.create(&event("Upcoming", (2030, 1, 1), "Bob")).unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(store.purge_past(today).unwrap(), 1);
        assert_eq!(store.purge_past(today).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn list_by_contact_matches_substring_any_case() {
        let mut store = EventStore::in_memory().unwrap();
        store
            .create(&event("Standup", (2030, 1, 10), "Alice,Bob"))
            .unwrap();
        store.create(&event("Retro", (2030, 1, 11), "Carol")).unwrap();

        let hits = store.list_by_contact("alice").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Standup");
        assert!(store.list_by_contact("dave").unwrap().is_empty());
    }

    #[test]
    fn listings_come_back_date_ascending() {
        let mut store = EventStore::in_memory().unwrap();
        store.create(&event("Later", (2030, 5, 1), "A")).unwrap();
        store.create(&event("Sooner", (2030, 1, 1), "A")).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all[0].name, "Sooner");
        assert_eq!(all[1].name, "Later");

        let ranged = store
            .list_by_date_range(
                NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
            )
            .unwrap();
        assert_eq!(ranged.len(), 2);
    }

    #[test]
    fn closed_store_fails_cleanly() {
        let mut store = EventStore::in_memory().unwrap();
        store.close().unwrap();
        assert!(matches!(store.count(), Err(BotError::Closed)));
    }
}
