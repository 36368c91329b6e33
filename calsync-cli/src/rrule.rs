//! Translation of RRULE fragments into structured repeat rules.
//!
//! Handles the subset the feed emits: FREQ, INTERVAL, COUNT, UNTIL and
//! BYDAY. Anything else degrades to the zero rule rather than failing
//! the sync.

use calsync_core::RecurrenceParser;
use calsync_core::event::RepeatRule;
use chrono::{NaiveDate, NaiveDateTime};

const DAY_SECS: i32 = 86_400;
const WEEK_SECS: i32 = 7 * DAY_SECS;
const MONTH_SECS: i32 = 30 * DAY_SECS;
const YEAR_SECS: i32 = 365 * DAY_SECS;

pub struct RuleParser;

impl RecurrenceParser for RuleParser {
    fn parse(&self, rule: &str, _start_epoch: i64) -> RepeatRule {
        let mut freq_secs = 0;
        let mut interval = 1;
        let mut limit = 0;
        let mut rule_mask = 0;

        for part in rule.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key {
                "FREQ" => freq_secs = freq_seconds(value),
                "INTERVAL" => interval = value.parse().unwrap_or(1),
                "COUNT" => limit = value.parse().unwrap_or(0),
                "UNTIL" => limit = until_epoch(value),
                "BYDAY" => rule_mask = weekday_mask(value),
                _ => {}
            }
        }

        if freq_secs == 0 {
            return RepeatRule::default();
        }

        RepeatRule {
            interval: freq_secs * interval,
            limit,
            rule_mask,
        }
    }
}

fn freq_seconds(value: &str) -> i32 {
    match value {
        "DAILY" => DAY_SECS,
        "WEEKLY" => WEEK_SECS,
        "MONTHLY" => MONTH_SECS,
        "YEARLY" => YEAR_SECS,
        _ => 0,
    }
}

/// Weekday bitmask for a BYDAY list; ordinal prefixes like `2MO` are
/// reduced to their weekday.
fn weekday_mask(value: &str) -> i32 {
    let mut mask = 0;
    for entry in value.split(',') {
        let day = entry
            .trim()
            .trim_start_matches(|c: char| c == '-' || c.is_ascii_digit());
        let bit = match day {
            "MO" => 0,
            "TU" => 1,
            "WE" => 2,
            "TH" => 3,
            "FR" => 4,
            "SA" => 5,
            "SU" => 6,
            _ => continue,
        };
        mask |= 1 << bit;
    }
    mask
}

/// UNTIL is either a UTC timestamp (`YYYYMMDDTHHMMSSZ`) or a bare date.
fn until_epoch(value: &str) -> i64 {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S") {
        return dt.and_utc().timestamp();
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        // unwrap safe: midnight exists on every date
        return date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rule: &str) -> RepeatRule {
        RuleParser.parse(rule, 0)
    }

    #[test]
    fn test_weekly_with_count() {
        let rule = parse("FREQ=WEEKLY;COUNT=5");
        assert_eq!(rule.interval, WEEK_SECS);
        assert_eq!(rule.limit, 5);
        assert_eq!(rule.rule_mask, 0);
    }

    #[test]
    fn test_interval_multiplies_frequency() {
        let rule = parse("FREQ=DAILY;INTERVAL=3");
        assert_eq!(rule.interval, 3 * DAY_SECS);
        assert_eq!(rule.limit, 0);
    }

    #[test]
    fn test_byday_builds_weekday_mask() {
        let rule = parse("FREQ=WEEKLY;BYDAY=MO,WE,FR");
        assert_eq!(rule.rule_mask, 0b10101);
    }

    #[test]
    fn test_byday_ordinals_reduced_to_weekday() {
        let rule = parse("FREQ=MONTHLY;BYDAY=2MO,-1FR");
        assert_eq!(rule.rule_mask, 0b10001);
    }

    #[test]
    fn test_until_becomes_epoch_limit() {
        let rule = parse("FREQ=DAILY;UNTIL=20200102T010000Z");
        assert_eq!(rule.limit, 1_577_926_800);
    }

    #[test]
    fn test_unknown_fragment_degrades_to_zero_rule() {
        assert_eq!(parse("FREQ=SECONDLY"), RepeatRule::default());
        assert_eq!(parse("not a rule"), RepeatRule::default());
        assert_eq!(parse(""), RepeatRule::default());
    }
}
