//! Local value types persisted by the event store.

use serde::{Deserialize, Serialize};

/// Flag bit on [`LocalEvent::flags`] marking an all-day event.
pub const FLAG_ALL_DAY: i32 = 1;

/// Sentinel for an unset reminder slot.
pub const REMINDER_OFF: i32 = -1;

/// A locally stored calendar event.
///
/// Identity across sync runs is `import_id`; the numeric `id` is assigned
/// by the store when the event is first committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEvent {
    pub id: i64,
    pub start_epoch: i64,
    pub end_epoch: i64,
    pub title: String,
    pub description: String,
    /// Up to three reminder offsets in minutes; -1 marks an empty slot.
    pub reminder_minutes: [i32; 3],
    pub repeat_interval: i32,
    pub import_id: String,
    pub flags: i32,
    pub repeat_limit: i64,
    pub repeat_rule_mask: i32,
    pub event_type_id: i64,
    /// Millisecond timestamp mirroring the remote `updated` instant.
    pub last_updated: i64,
}

impl LocalEvent {
    pub fn is_all_day(&self) -> bool {
        self.flags & FLAG_ALL_DAY != 0
    }
}

/// A local event category. Synced events get one per remote color id,
/// titled `google_sync_<colorId>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub id: i64,
    pub title: String,
    pub color: i32,
}

/// Structured recurrence: repeat interval in seconds, an occurrence/until
/// limit and a weekday bitmask. The zero value means "does not repeat".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatRule {
    pub interval: i32,
    pub limit: i64,
    pub rule_mask: i32,
}
