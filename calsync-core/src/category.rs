//! Event-type resolution for synced events.

use crate::error::SyncResult;
use crate::event::EventType;
use crate::store::EventStore;

/// Title prefix of event types created by the sync.
const SYNC_TYPE_PREFIX: &str = "google_sync_";

/// Map a remote color id to a local event-type id, creating the type on
/// first sight.
///
/// `cache` is the run's view of the store's event types and must be
/// seeded from it at sync start; each distinct color id creates at most
/// one type per run, and a matching title from an earlier run is reused.
pub fn resolve_event_type<S: EventStore>(
    store: &S,
    cache: &mut Vec<EventType>,
    color_id: &str,
    default_color: i32,
) -> SyncResult<i64> {
    let title = format!("{SYNC_TYPE_PREFIX}{color_id}");

    if let Some(existing) = cache
        .iter()
        .find(|t| t.title.eq_ignore_ascii_case(&title))
    {
        return Ok(existing.id);
    }

    let mut event_type = EventType {
        id: 0,
        title,
        color: default_color,
    };
    event_type.id = store.insert_event_type(&event_type)?;

    let id = event_type.id;
    cache.push(event_type);
    Ok(id)
}
