//! Wire models for the remote calendar feed.
//!
//! These mirror the JSON shape of the feed's `events.list` response. A
//! `RemoteEvent` is transient: it exists only while the page that carried
//! it is being processed.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SyncResult;

/// Event status the merge policy accepts.
pub const CONFIRMED: &str = "confirmed";

/// Transport seam to the remote feed.
///
/// Implementations own credentials, HTTP transport and the pagination
/// wire format. Failures surface unchanged as `SyncError` values,
/// including the auth-recoverable condition.
pub trait FeedClient {
    /// Fetch one page of the feed for `calendar_id`. The first request
    /// uses the empty token.
    fn list_page(
        &self,
        calendar_id: &str,
        page_token: &str,
    ) -> impl Future<Output = SyncResult<FeedPage>>;
}

/// One page of the raw feed: the undecoded `items` array plus the
/// continuation token, if any.
///
/// `items` stays a raw JSON value so that the whole page decodes together
/// in a single step downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Value,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// One raw event from the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEvent {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub start: Option<RemoteTime>,
    pub end: Option<RemoteTime>,
    #[serde(default)]
    pub recurrence: Vec<String>,
    #[serde(default)]
    pub reminders: RemoteReminders,
    #[serde(rename = "colorId", default)]
    pub color_id: String,
    /// Stable external identifier tying the event to its remote origin.
    #[serde(rename = "iCalUID")]
    pub import_id: String,
    pub updated: DateTime<Utc>,
}

impl RemoteEvent {
    pub fn is_confirmed(&self) -> bool {
        self.status == CONFIRMED
    }

    /// Millisecond timestamp of the remote last-modified instant.
    pub fn updated_millis(&self) -> i64 {
        self.updated.timestamp_millis()
    }
}

/// An event boundary: either a date-only value (all-day events) or a full
/// date-time. The wire carries `{"date": ...}` or `{"dateTime": ...}`,
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTime")]
pub enum RemoteTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

#[derive(Deserialize)]
struct RawTime {
    date: Option<NaiveDate>,
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<Utc>>,
}

impl TryFrom<RawTime> for RemoteTime {
    type Error = String;

    fn try_from(raw: RawTime) -> Result<Self, Self::Error> {
        match (raw.date, raw.date_time) {
            (Some(date), None) => Ok(RemoteTime::Date(date)),
            (None, Some(date_time)) => Ok(RemoteTime::DateTime(date_time)),
            (Some(_), Some(_)) => Err("boundary has both date and dateTime".to_string()),
            (None, None) => Err("boundary has neither date nor dateTime".to_string()),
        }
    }
}

/// The `reminders` object on a raw event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteReminders {
    #[serde(default)]
    pub overrides: Vec<RemoteReminder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteReminder {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub minutes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_remote_time_date() {
        let time: RemoteTime = serde_json::from_value(json!({ "date": "2020-01-01" })).unwrap();
        assert_eq!(
            time,
            RemoteTime::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_remote_time_date_time() {
        let time: RemoteTime =
            serde_json::from_value(json!({ "dateTime": "2020-01-01T10:30:00Z" })).unwrap();
        assert_eq!(
            time,
            RemoteTime::DateTime(Utc.with_ymd_and_hms(2020, 1, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_remote_time_converts_offsets_to_utc() {
        let time: RemoteTime =
            serde_json::from_value(json!({ "dateTime": "2020-01-01T12:00:00+02:00" })).unwrap();
        assert_eq!(
            time,
            RemoteTime::DateTime(Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_remote_time_rejects_both_and_neither() {
        assert!(
            serde_json::from_value::<RemoteTime>(
                json!({ "date": "2020-01-01", "dateTime": "2020-01-01T10:00:00Z" })
            )
            .is_err()
        );
        assert!(serde_json::from_value::<RemoteTime>(json!({})).is_err());
    }

    #[test]
    fn test_event_decode() {
        let event: RemoteEvent = serde_json::from_value(json!({
            "status": "confirmed",
            "summary": "Standup",
            "description": "Daily sync",
            "start": { "dateTime": "2020-03-02T09:00:00Z" },
            "end": { "dateTime": "2020-03-02T09:15:00Z" },
            "recurrence": ["RRULE:FREQ=DAILY"],
            "reminders": { "useDefault": false, "overrides": [{ "method": "popup", "minutes": 10 }] },
            "colorId": "11",
            "iCalUID": "abc123@google.com",
            "updated": "2020-03-01T18:00:00.000Z"
        }))
        .unwrap();

        assert!(event.is_confirmed());
        assert_eq!(event.import_id, "abc123@google.com");
        assert_eq!(event.color_id, "11");
        assert_eq!(event.recurrence, vec!["RRULE:FREQ=DAILY"]);
        assert_eq!(event.reminders.overrides.len(), 1);
        assert_eq!(
            event.updated_millis(),
            Utc.with_ymd_and_hms(2020, 3, 1, 18, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }

    #[test]
    fn test_event_decode_requires_import_id_and_updated() {
        let missing_uid = json!({ "status": "confirmed", "updated": "2020-03-01T18:00:00Z" });
        assert!(serde_json::from_value::<RemoteEvent>(missing_uid).is_err());

        let missing_updated = json!({ "status": "confirmed", "iCalUID": "x@google.com" });
        assert!(serde_json::from_value::<RemoteEvent>(missing_updated).is_err());
    }

    #[test]
    fn test_page_decode() {
        let page: FeedPage = serde_json::from_value(json!({
            "items": [{ "iCalUID": "a", "updated": "2020-01-01T00:00:00Z" }],
            "nextPageToken": "token-2"
        }))
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("token-2"));
        assert!(page.items.is_array());

        let last: FeedPage = serde_json::from_value(json!({ "items": [] })).unwrap();
        assert!(last.next_page_token.is_none());
    }
}
