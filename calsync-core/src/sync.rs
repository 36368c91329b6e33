//! The sync orchestrator.
//!
//! Seeds per-run caches from the store, then walks the feed page by page:
//! merge decision, field normalization, category resolution, commit.
//! Runs strictly sequentially on the caller's task; the caller serializes
//! runs (at most one in flight).

use serde_json::Value;

use crate::category::resolve_event_type;
use crate::error::{SyncError, SyncResult};
use crate::event::{EventType, LocalEvent};
use crate::merge::should_accept;
use crate::normalize::normalize;
use crate::pager::Pager;
use crate::recurrence::RecurrenceParser;
use crate::remote::{FeedClient, RemoteEvent};
use crate::store::EventStore;

/// Lifecycle of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Counters for one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub pages: usize,
    pub fetched: usize,
    pub committed: usize,
    pub skipped: usize,
}

/// One full resync of the configured feed against the local store.
pub struct Syncer<'a, C, S, P> {
    client: &'a C,
    store: &'a S,
    parser: &'a P,
    calendar_id: &'a str,
    default_color: i32,
    state: SyncState,
}

impl<'a, C, S, P> Syncer<'a, C, S, P>
where
    C: FeedClient,
    S: EventStore,
    P: RecurrenceParser,
{
    pub fn new(
        client: &'a C,
        store: &'a S,
        parser: &'a P,
        calendar_id: &'a str,
        default_color: i32,
    ) -> Self {
        Syncer {
            client,
            store,
            parser,
            calendar_id,
            default_color,
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Run the sync to completion.
    ///
    /// Any failure cancels the run in place; events committed before the
    /// failure stay committed. An [`SyncError::AuthRequired`] error
    /// carries the recovery payload for the host to act on.
    pub async fn run(&mut self) -> SyncResult<SyncStats> {
        self.state = SyncState::Running;

        match self.sync_all().await {
            Ok(stats) => {
                self.state = SyncState::Completed;
                Ok(stats)
            }
            Err(e) => {
                self.state = SyncState::Cancelled;
                Err(e)
            }
        }
    }

    async fn sync_all(&mut self) -> SyncResult<SyncStats> {
        let mut known_ids = self.store.import_ids()?;
        let mut event_types = self.store.event_types()?;
        let mut stats = SyncStats::default();

        let mut pager = Pager::new(self.client, self.calendar_id);
        while let Some(page) = pager.next_page().await? {
            stats.pages += 1;

            for remote in decode_items(page.items)? {
                stats.fetched += 1;

                if !should_accept(&remote, &mut known_ids, self.store)? {
                    stats.skipped += 1;
                    continue;
                }

                self.commit(&remote, &mut event_types)?;
                stats.committed += 1;
            }
        }

        Ok(stats)
    }

    fn commit(&self, remote: &RemoteEvent, event_types: &mut Vec<EventType>) -> SyncResult<()> {
        let fields = normalize(remote, self.parser)?;
        let event_type_id = resolve_event_type(
            self.store,
            event_types,
            &remote.color_id,
            self.default_color,
        )?;

        let event = LocalEvent {
            id: 0,
            start_epoch: fields.start_epoch,
            end_epoch: fields.end_epoch,
            title: remote.summary.clone(),
            description: remote.description.clone(),
            reminder_minutes: fields.reminder_minutes,
            repeat_interval: fields.repeat.interval,
            import_id: remote.import_id.clone(),
            flags: fields.flags,
            repeat_limit: fields.repeat.limit,
            repeat_rule_mask: fields.repeat.rule_mask,
            event_type_id,
            last_updated: remote.updated_millis(),
        };

        self.store.upsert_event(&event)?;
        Ok(())
    }
}

/// Decode one page's `items` array in a single step; a malformed item
/// fails the whole page.
fn decode_items(items: Value) -> SyncResult<Vec<RemoteEvent>> {
    if items.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(items).map_err(|e| SyncError::Decode(e.to_string()))
}
