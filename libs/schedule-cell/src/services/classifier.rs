use serde::{Deserialize, Serialize};

use crate::models::{Interval, TimeOfDay};
use crate::services::time::duration_minutes;

/// Full-time shift: exactly 07:00-17:00.
pub const FULL_TIME_WINDOW: Interval = Interval {
    start: TimeOfDay::at(7, 0),
    end: TimeOfDay::at(17, 0),
};

/// Lunch break a full-time shift must span. 11:00-13:00 is the canonical
/// window; the narrower 12:00-13:00 variant is not used.
pub const LUNCH_BREAK_WINDOW: Interval = Interval {
    start: TimeOfDay::at(11, 0),
    end: TimeOfDay::at(13, 0),
};

pub const FOUR_HOUR_SHIFT_MINUTES: i32 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftClassification {
    pub full_time: bool,
    pub covers_lunch: bool,
    pub four_hour: bool,
}

impl ShiftClassification {
    /// Counts toward the weekly full-time tally.
    pub fn is_qualifying_full_time(&self) -> bool {
        self.full_time && self.covers_lunch
    }

    /// Counts toward the weekly part-time tally.
    pub fn is_qualifying_part_time(&self) -> bool {
        self.four_hour
    }
}

pub fn is_full_time_shift(interval: &Interval) -> bool {
    *interval == FULL_TIME_WINDOW
}

pub fn covers_lunch_break(interval: &Interval, lunch_window: &Interval) -> bool {
    interval.start <= lunch_window.start && interval.end >= lunch_window.end
}

pub fn is_four_hour_shift(interval: &Interval) -> bool {
    duration_minutes(interval) == FOUR_HOUR_SHIFT_MINUTES
}

pub fn classify(interval: &Interval) -> ShiftClassification {
    ShiftClassification {
        full_time: is_full_time_shift(interval),
        covers_lunch: covers_lunch_break(interval, &LUNCH_BREAK_WINDOW),
        four_hour: is_four_hour_shift(interval),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start: &str, end: &str) -> Interval {
        Interval::parse(start, end).unwrap()
    }

    #[test]
    fn test_full_time_requires_exact_window() {
        assert!(is_full_time_shift(&interval("07:00", "17:00")));
        assert!(!is_full_time_shift(&interval("08:00", "17:00")));
        assert!(!is_full_time_shift(&interval("07:00", "17:30")));
    }

    #[test]
    fn test_four_hour_shift() {
        assert!(is_four_hour_shift(&interval("07:00", "11:00")));
        assert!(is_four_hour_shift(&interval("13:00", "17:00")));
        assert!(!is_four_hour_shift(&interval("07:00", "12:00")));
    }

    #[test]
    fn test_lunch_coverage_is_inclusive_at_both_edges() {
        assert!(covers_lunch_break(&interval("11:00", "13:00"), &LUNCH_BREAK_WINDOW));
        assert!(covers_lunch_break(&interval("07:00", "17:00"), &LUNCH_BREAK_WINDOW));
        assert!(!covers_lunch_break(&interval("11:30", "17:00"), &LUNCH_BREAK_WINDOW));
        assert!(!covers_lunch_break(&interval("07:00", "12:00"), &LUNCH_BREAK_WINDOW));
    }

    #[test]
    fn test_classify_full_day() {
        let classification = classify(&interval("07:00", "17:00"));

        assert!(classification.is_qualifying_full_time());
        assert!(!classification.is_qualifying_part_time());
    }

    #[test]
    fn test_classify_morning_half() {
        let classification = classify(&interval("07:00", "11:00"));

        assert!(!classification.is_qualifying_full_time());
        assert!(classification.is_qualifying_part_time());
        assert!(!classification.covers_lunch);
    }
}
