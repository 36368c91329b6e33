//! SQLite-backed event store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use calsync_core::event::{EventType, LocalEvent};
use calsync_core::{EventStore, SyncError, SyncResult};

/// Thread-safe wrapper around the SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init()?;

        Ok(store)
    }

    /// Initialize the database schema.
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS event_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                color INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_epoch INTEGER NOT NULL,
                end_epoch INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                reminder_1 INTEGER NOT NULL DEFAULT -1,
                reminder_2 INTEGER NOT NULL DEFAULT -1,
                reminder_3 INTEGER NOT NULL DEFAULT -1,
                repeat_interval INTEGER NOT NULL DEFAULT 0,
                import_id TEXT NOT NULL UNIQUE,
                flags INTEGER NOT NULL DEFAULT 0,
                repeat_limit INTEGER NOT NULL DEFAULT 0,
                repeat_rule_mask INTEGER NOT NULL DEFAULT 0,
                event_type_id INTEGER NOT NULL DEFAULT 0,
                last_updated INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (event_type_id) REFERENCES event_types(id)
            );

            CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_epoch);
            "#,
        )?;

        Ok(())
    }

    /// Number of synced events.
    pub fn event_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of event types.
    pub fn event_type_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM event_types", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn db_err(e: rusqlite::Error) -> SyncError {
    SyncError::Store(e.to_string())
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<LocalEvent> {
    Ok(LocalEvent {
        id: row.get(0)?,
        start_epoch: row.get(1)?,
        end_epoch: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        reminder_minutes: [row.get(5)?, row.get(6)?, row.get(7)?],
        repeat_interval: row.get(8)?,
        import_id: row.get(9)?,
        flags: row.get(10)?,
        repeat_limit: row.get(11)?,
        repeat_rule_mask: row.get(12)?,
        event_type_id: row.get(13)?,
        last_updated: row.get(14)?,
    })
}

impl EventStore for SqliteStore {
    fn event_types(&self) -> SyncResult<Vec<EventType>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, title, color FROM event_types")
            .map_err(db_err)?;
        let types = stmt
            .query_map([], |row| {
                Ok(EventType {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    color: row.get(2)?,
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(types)
    }

    fn insert_event_type(&self, event_type: &EventType) -> SyncResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO event_types (title, color) VALUES (?1, ?2)",
            params![event_type.title, event_type.color],
        )
        .map_err(db_err)?;
        Ok(conn.last_insert_rowid())
    }

    fn import_ids(&self) -> SyncResult<HashSet<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT import_id FROM events")
            .map_err(db_err)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?
            .collect::<Result<HashSet<_>, _>>()
            .map_err(db_err)?;
        Ok(ids)
    }

    fn event_by_import_id(&self, import_id: &str) -> SyncResult<Option<LocalEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, start_epoch, end_epoch, title, description,
                        reminder_1, reminder_2, reminder_3, repeat_interval,
                        import_id, flags, repeat_limit, repeat_rule_mask,
                        event_type_id, last_updated
                 FROM events WHERE import_id = ?1",
            )
            .map_err(db_err)?;
        let mut rows = stmt
            .query_map(params![import_id], row_to_event)
            .map_err(db_err)?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(db_err)?)),
            None => Ok(None),
        }
    }

    fn upsert_event(&self, event: &LocalEvent) -> SyncResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO events (start_epoch, end_epoch, title, description,
                                 reminder_1, reminder_2, reminder_3, repeat_interval,
                                 import_id, flags, repeat_limit, repeat_rule_mask,
                                 event_type_id, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(import_id) DO UPDATE SET
                 start_epoch = excluded.start_epoch,
                 end_epoch = excluded.end_epoch,
                 title = excluded.title,
                 description = excluded.description,
                 reminder_1 = excluded.reminder_1,
                 reminder_2 = excluded.reminder_2,
                 reminder_3 = excluded.reminder_3,
                 repeat_interval = excluded.repeat_interval,
                 flags = excluded.flags,
                 repeat_limit = excluded.repeat_limit,
                 repeat_rule_mask = excluded.repeat_rule_mask,
                 event_type_id = excluded.event_type_id,
                 last_updated = excluded.last_updated",
            params![
                event.start_epoch,
                event.end_epoch,
                event.title,
                event.description,
                event.reminder_minutes[0],
                event.reminder_minutes[1],
                event.reminder_minutes[2],
                event.repeat_interval,
                event.import_id,
                event.flags,
                event.repeat_limit,
                event.repeat_rule_mask,
                event.event_type_id,
                event.last_updated,
            ],
        )
        .map_err(db_err)?;

        // The rowid is unchanged when the conflict branch updated in place.
        let id = conn
            .query_row(
                "SELECT id FROM events WHERE import_id = ?1",
                params![event.import_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::event::REMINDER_OFF;

    fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
        SqliteStore::open(&dir.path().join("events.db")).unwrap()
    }

    fn make_event(import_id: &str, last_updated: i64) -> LocalEvent {
        LocalEvent {
            id: 0,
            start_epoch: 1_577_840_400,
            end_epoch: 1_577_844_000,
            title: "Planning".to_string(),
            description: "Quarterly planning".to_string(),
            reminder_minutes: [10, REMINDER_OFF, REMINDER_OFF],
            repeat_interval: 0,
            import_id: import_id.to_string(),
            flags: 0,
            repeat_limit: 0,
            repeat_rule_mask: 0,
            event_type_id: 1,
            last_updated,
        }
    }

    #[test]
    fn test_roundtrip_event() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let id = store.upsert_event(&make_event("a@google.com", 5)).unwrap();
        let stored = store.event_by_import_id("a@google.com").unwrap().unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.title, "Planning");
        assert_eq!(stored.reminder_minutes, [10, REMINDER_OFF, REMINDER_OFF]);
        assert_eq!(stored.last_updated, 5);
    }

    #[test]
    fn test_upsert_keeps_one_row_per_import_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let first = store.upsert_event(&make_event("a@google.com", 5)).unwrap();

        let mut newer = make_event("a@google.com", 6);
        newer.title = "Planning v2".to_string();
        let second = store.upsert_event(&newer).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.event_count().unwrap(), 1);
        let stored = store.event_by_import_id("a@google.com").unwrap().unwrap();
        assert_eq!(stored.title, "Planning v2");
    }

    #[test]
    fn test_import_ids_seeded_from_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store.upsert_event(&make_event("a@google.com", 1)).unwrap();
        store.upsert_event(&make_event("b@google.com", 1)).unwrap();

        let ids = store.import_ids().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("a@google.com"));
    }

    #[test]
    fn test_event_types_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let id = store
            .insert_event_type(&EventType {
                id: 0,
                title: "google_sync_11".to_string(),
                color: 7,
            })
            .unwrap();

        let types = store.event_types().unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].id, id);
        assert_eq!(types[0].color, 7);
    }

    #[test]
    fn test_missing_event_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        assert!(store.event_by_import_id("nope").unwrap().is_none());
    }
}
