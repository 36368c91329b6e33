//! The per-record accept/skip decision.

use std::collections::HashSet;

use crate::error::SyncResult;
use crate::remote::RemoteEvent;
use crate::store::EventStore;

/// Decide whether a remote record should be committed locally.
///
/// Non-confirmed records are never accepted. A record whose import id is
/// already known is accepted only when the remote copy is strictly newer
/// than the stored one. Accepted ids enter `known_ids` before the next
/// record is evaluated, so a feed that repeats an id within one run
/// commits it once.
///
/// `known_ids` must be seeded from the store's import ids at sync start.
pub fn should_accept<S: EventStore>(
    remote: &RemoteEvent,
    known_ids: &mut HashSet<String>,
    store: &S,
) -> SyncResult<bool> {
    if !remote.is_confirmed() {
        return Ok(false);
    }

    if known_ids.contains(&remote.import_id)
        && let Some(existing) = store.event_by_import_id(&remote.import_id)?
        && existing.last_updated >= remote.updated_millis()
    {
        return Ok(false);
    }

    known_ids.insert(remote.import_id.clone());
    Ok(true)
}
