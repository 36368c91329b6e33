//! Reconciliation engine for pulling a remote calendar feed into a local
//! event store.
//!
//! The engine is transport- and storage-agnostic: callers inject a
//! [`FeedClient`], an [`EventStore`] and a [`RecurrenceParser`], and a
//! [`Syncer`] drives one full poll-based resync: paginated retrieval,
//! confirmed-only filtering, newest-wins change detection keyed on the
//! remote import id, and field normalization into local value semantics.

pub mod category;
pub mod error;
pub mod event;
pub mod merge;
pub mod normalize;
pub mod pager;
pub mod recurrence;
pub mod remote;
pub mod store;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use event::{EventType, FLAG_ALL_DAY, LocalEvent, REMINDER_OFF, RepeatRule};
pub use recurrence::RecurrenceParser;
pub use remote::{FeedClient, FeedPage, RemoteEvent, RemoteTime};
pub use store::{EventStore, MemoryStore};
pub use sync::{SyncState, SyncStats, Syncer};
