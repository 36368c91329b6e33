//! The local store seam and an in-memory implementation.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::SyncResult;
use crate::event::{EventType, LocalEvent};

/// Operations the sync engine needs from the local store.
///
/// Calls are synchronous: a run accesses the store from a single thread,
/// so no callback chaining or internal locking contract is required of
/// the engine itself.
pub trait EventStore {
    /// All known event types.
    fn event_types(&self) -> SyncResult<Vec<EventType>>;

    /// Persist a new event type and return its assigned id.
    fn insert_event_type(&self, event_type: &EventType) -> SyncResult<i64>;

    /// Every import id already present in the store.
    fn import_ids(&self) -> SyncResult<HashSet<String>>;

    /// Look up the locally stored event for an import id.
    fn event_by_import_id(&self, import_id: &str) -> SyncResult<Option<LocalEvent>>;

    /// Commit an event, replacing any existing row with the same import
    /// id. Returns the row id.
    fn upsert_event(&self, event: &LocalEvent) -> SyncResult<i64>;
}

/// In-memory event store.
///
/// Backs the engine's tests and works as a scratch target; the CLI wires
/// a SQLite store with the same upsert semantics.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    events: Vec<LocalEvent>,
    event_types: Vec<EventType>,
    next_event_id: i64,
    next_type_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }

    /// Snapshot of all stored events.
    pub fn events(&self) -> Vec<LocalEvent> {
        self.inner.lock().unwrap().events.clone()
    }
}

impl EventStore for MemoryStore {
    fn event_types(&self) -> SyncResult<Vec<EventType>> {
        Ok(self.inner.lock().unwrap().event_types.clone())
    }

    fn insert_event_type(&self, event_type: &EventType) -> SyncResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_type_id += 1;
        let id = inner.next_type_id;
        let mut stored = event_type.clone();
        stored.id = id;
        inner.event_types.push(stored);
        Ok(id)
    }

    fn import_ids(&self) -> SyncResult<HashSet<String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .events
            .iter()
            .map(|e| e.import_id.clone())
            .collect())
    }

    fn event_by_import_id(&self, import_id: &str) -> SyncResult<Option<LocalEvent>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .events
            .iter()
            .find(|e| e.import_id == import_id)
            .cloned())
    }

    fn upsert_event(&self, event: &LocalEvent) -> SyncResult<i64> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(existing) = inner
            .events
            .iter_mut()
            .find(|e| e.import_id == event.import_id)
        {
            // Keep the originally assigned row id.
            let id = existing.id;
            *existing = event.clone();
            existing.id = id;
            return Ok(id);
        }

        inner.next_event_id += 1;
        let id = inner.next_event_id;
        let mut stored = event.clone();
        stored.id = id;
        inner.events.push(stored);
        Ok(id)
    }
}
