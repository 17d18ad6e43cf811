//! Minute arithmetic over `HH:MM` times and half-open intervals.
//!
//! Everything here works on plain minute offsets so slot boundaries never
//! drift with daylight saving or timezone conversion.

use crate::error::ScheduleError;
use crate::models::{Interval, TimeOfDay};

/// Minutes since midnight for a strict `HH:MM` string.
pub fn to_minutes(raw: &str) -> Result<u16, ScheduleError> {
    TimeOfDay::parse(raw).map(TimeOfDay::minutes)
}

pub fn is_after(a: TimeOfDay, b: TimeOfDay) -> bool {
    a.minutes() > b.minutes()
}

/// `end - start` in minutes. Zero or negative means the interval is
/// malformed; callers decide what to do with that.
pub fn duration_minutes(interval: &Interval) -> i32 {
    interval.end.minutes() as i32 - interval.start.minutes() as i32
}

/// Touching endpoints do not overlap.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && a.end > b.start
}

pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}
