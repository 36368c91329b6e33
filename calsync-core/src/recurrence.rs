//! The recurrence-parsing seam.

use crate::event::RepeatRule;

/// Translates a normalized recurrence fragment into a structured rule.
///
/// The fragment is the part of the first raw recurrence entry left after
/// quote and `RRULE:` stripping; `start_epoch` is the event's normalized
/// start, for rules that anchor on it.
pub trait RecurrenceParser {
    fn parse(&self, rule: &str, start_epoch: i64) -> RepeatRule;
}
