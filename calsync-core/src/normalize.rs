//! Field normalization from wire records to local value semantics.
//!
//! Pure aside from the injected recurrence parser; only called on records
//! the merge decision has already accepted.

use chrono::NaiveDate;

use crate::error::{SyncError, SyncResult};
use crate::event::{FLAG_ALL_DAY, REMINDER_OFF, RepeatRule};
use crate::recurrence::RecurrenceParser;
use crate::remote::{RemoteEvent, RemoteTime};

/// Seconds in one day; all-day end boundaries are pulled in by this much.
const DAY_SECS: i64 = 86_400;

/// Marker prefixing raw recurrence fragments on the wire.
const RRULE_PREFIX: &str = "RRULE:";

/// Reminder method the normalizer keeps; other methods are ignored.
const POPUP: &str = "popup";

/// Normalized local field values for one accepted remote event.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    pub start_epoch: i64,
    pub end_epoch: i64,
    pub flags: i32,
    pub reminder_minutes: [i32; 3],
    pub repeat: RepeatRule,
}

/// Convert a remote event's raw fields into local value semantics.
///
/// Date-only boundaries mark an all-day event anchored at hour 1 of each
/// date; the feed's exclusive all-day end date is pulled in by one day to
/// the local inclusive convention.
pub fn normalize<P: RecurrenceParser>(
    remote: &RemoteEvent,
    parser: &P,
) -> SyncResult<NormalizedFields> {
    let start = remote
        .start
        .as_ref()
        .ok_or_else(|| SyncError::Decode(format!("event {} has no start time", remote.import_id)))?;
    let end = remote
        .end
        .as_ref()
        .ok_or_else(|| SyncError::Decode(format!("event {} has no end time", remote.import_id)))?;

    let (start_epoch, mut end_epoch, flags) = match (start, end) {
        (RemoteTime::Date(s), RemoteTime::Date(e)) => {
            (day_anchor_epoch(*s), day_anchor_epoch(*e), FLAG_ALL_DAY)
        }
        (RemoteTime::DateTime(s), RemoteTime::DateTime(e)) => (s.timestamp(), e.timestamp(), 0),
        _ => {
            return Err(SyncError::Decode(format!(
                "event {} mixes date and dateTime boundaries",
                remote.import_id
            )));
        }
    };

    if flags & FLAG_ALL_DAY != 0 && end_epoch > start_epoch {
        end_epoch -= DAY_SECS;
    }

    Ok(NormalizedFields {
        start_epoch,
        end_epoch,
        flags,
        reminder_minutes: reminder_slots(remote),
        repeat: repeat_rule(remote, start_epoch, parser),
    })
}

/// Epoch seconds for hour 1 (UTC) of the given date. The non-midnight
/// anchor keeps all-day boundaries clear of timezone rollover.
fn day_anchor_epoch(date: NaiveDate) -> i64 {
    // unwrap safe: hour 1 exists on every date
    date.and_hms_opt(1, 0, 0).unwrap().and_utc().timestamp()
}

/// Popup-method reminder offsets, in feed order, mapped into the three
/// local slots. Overrides beyond the third popup are dropped.
fn reminder_slots(remote: &RemoteEvent) -> [i32; 3] {
    let mut slots = [REMINDER_OFF; 3];
    let popups = remote
        .reminders
        .overrides
        .iter()
        .filter(|r| r.method == POPUP)
        .map(|r| r.minutes);
    for (slot, minutes) in slots.iter_mut().zip(popups) {
        *slot = minutes;
    }
    slots
}

/// Extract the first recurrence fragment, strip wrapping quotes and the
/// `RRULE:` marker, and hand the remainder to the parser.
fn repeat_rule<P: RecurrenceParser>(
    remote: &RemoteEvent,
    start_epoch: i64,
    parser: &P,
) -> RepeatRule {
    match remote.recurrence.first() {
        Some(raw) => {
            let fragment = raw.trim_matches('"');
            let fragment = fragment.strip_prefix(RRULE_PREFIX).unwrap_or(fragment);
            parser.parse(fragment, start_epoch)
        }
        None => RepeatRule::default(),
    }
}
