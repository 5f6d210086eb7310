//! Time-of-day arithmetic on `HH:MM` strings and minutes since midnight.
//!
//! These helpers are lenient on purpose: malformed input degrades to `0` or is
//! returned unchanged instead of producing an error. Values that end up in a
//! booking request are validated separately before submission.

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minutes in a day, used for clock wrap-around.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Length of a billable extension block.
pub const BLOCK_MINUTES: i64 = 30;

/// Display placeholder for a missing time value.
pub const MISSING_TIME: &str = "-";

/// `H`, `HH`, `HH:MM` or `HH:MM:SS` (database time columns carry seconds).
static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2})(?::(\d{1,2}))?(?::\d{1,2})?\s*$").expect("valid time pattern")
});

fn parse_parts(t: &str) -> Option<(i64, i64)> {
    let caps = TIME_PATTERN.captures(t)?;
    let hours = caps.get(1)?.as_str().parse::<i64>().ok()?;
    let minutes = caps
        .get(2)
        .map(|m| m.as_str().parse::<i64>())
        .transpose()
        .ok()?
        .unwrap_or(0);
    Some((hours, minutes))
}

/// Parse `HH:MM` into minutes since midnight. Missing or malformed input is `0`.
pub fn to_minutes(t: &str) -> i64 {
    parse_parts(t).map(|(h, m)| h * 60 + m).unwrap_or(0)
}

/// Format minutes since midnight as zero-padded `HH:MM`, wrapping around the clock.
pub fn from_minutes(minutes: i64) -> String {
    let wrapped = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// Add `delta` minutes to a time of day using clock arithmetic.
pub fn add_minutes(t: &str, delta: i64) -> String {
    from_minutes(to_minutes(t) + delta)
}

/// Normalize a loosely formatted time for display.
///
/// `"10"` becomes `"10:00"` and `"09:30:00"` becomes `"09:30"`. Missing input
/// yields [`MISSING_TIME`], which callers must not feed back into arithmetic.
/// Anything else that cannot be parsed is returned unchanged.
pub fn clean_time(t: Option<&str>) -> String {
    match t.map(str::trim) {
        None | Some("") => MISSING_TIME.to_string(),
        Some(raw) => match parse_parts(raw) {
            Some((h, m)) => format!("{:02}:{:02}", h, m),
            None => raw.to_string(),
        },
    }
}

/// Number of whole 30-minute blocks needed to cover `minutes`. Non-positive input is `0`.
pub fn ceil_to_block30(minutes: i64) -> i64 {
    if minutes <= 0 {
        0
    } else {
        (minutes + BLOCK_MINUTES - 1) / BLOCK_MINUTES
    }
}

pub fn minutes_of(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Strict parse used where a real `NaiveTime` is required.
pub fn to_naive_time(t: &str) -> Option<NaiveTime> {
    let (h, m) = parse_parts(t)?;
    NaiveTime::from_hms_opt(u32::try_from(h).ok()?, u32::try_from(m).ok()?, 0)
}
