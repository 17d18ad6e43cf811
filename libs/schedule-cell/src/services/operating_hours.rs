use chrono::{Datelike, NaiveDate};

use crate::error::ScheduleError;
use crate::models::{Facility, Interval};

/// `Ok(())` when `proposed` sits inside the facility's window for the weekday
/// of `date`; otherwise an `OutOfHours` error saying why.
pub fn check_operating_hours(
    facility: &Facility,
    date: NaiveDate,
    proposed: &Interval,
) -> Result<(), ScheduleError> {
    let weekday = date.weekday();

    match facility.window_for(weekday) {
        None => Err(ScheduleError::OutOfHours {
            weekday: weekday.to_string(),
            interval: proposed.to_string(),
            reason: format!("{} is closed", facility.name),
        }),
        Some(window) if !window.contains(proposed) => Err(ScheduleError::OutOfHours {
            weekday: weekday.to_string(),
            interval: proposed.to_string(),
            reason: format!("{} is open {}", facility.name, window),
        }),
        Some(_) => Ok(()),
    }
}

pub fn is_within_operating_hours(facility: &Facility, date: NaiveDate, proposed: &Interval) -> bool {
    check_operating_hours(facility, date, proposed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use chrono::Weekday;
    use uuid::Uuid;

    fn clinic() -> Facility {
        let mut operating_hours = HashMap::new();
        for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            operating_hours.insert(weekday, Interval::parse("07:00", "19:00").unwrap());
        }
        operating_hours.insert(Weekday::Sat, Interval::parse("08:00", "12:00").unwrap());

        Facility {
            location_id: Uuid::new_v4(),
            name: "Main Clinic".to_string(),
            operating_hours,
        }
    }

    // 2024-03-04 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_interval_inside_window() {
        let facility = clinic();

        assert!(is_within_operating_hours(&facility, monday(), &Interval::parse("07:00", "19:00").unwrap()));
        assert!(is_within_operating_hours(&facility, monday(), &Interval::parse("09:00", "13:00").unwrap()));
    }

    #[test]
    fn test_interval_spilling_past_close() {
        let facility = clinic();
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        assert!(!is_within_operating_hours(&facility, saturday, &Interval::parse("09:00", "13:00").unwrap()));
        assert!(!is_within_operating_hours(&facility, monday(), &Interval::parse("06:30", "10:00").unwrap()));
    }

    #[test]
    fn test_closed_day_rejects_everything() {
        let facility = clinic();
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let result = check_operating_hours(&facility, sunday, &Interval::parse("09:00", "10:00").unwrap());

        assert_matches!(result, Err(ScheduleError::OutOfHours { weekday, .. }) if weekday == "Sun");
    }
}
