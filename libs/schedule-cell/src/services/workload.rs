use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{DateRange, ShiftAssignment};
use crate::services::time::{duration_minutes, minutes_to_hours};

/// Committed hours for `person_id` across `range`, in hours.
///
/// Malformed shifts contribute nothing rather than a negative amount.
pub fn hours_in_range(
    person_id: Uuid,
    range: &DateRange,
    shifts: &[ShiftAssignment],
    exclude_id: Option<Uuid>,
) -> f64 {
    let minutes: i64 = shifts
        .iter()
        .filter(|shift| shift.person_id == person_id)
        .filter(|shift| shift.is_committed())
        .filter(|shift| Some(shift.id) != exclude_id)
        .filter(|shift| range.contains(shift.shift_date))
        .map(|shift| duration_minutes(&shift.interval()).max(0) as i64)
        .sum();

    minutes_to_hours(minutes)
}

/// Hours over `[week_start, week_start + 7 days)`.
pub fn weekly_hours(person_id: Uuid, week_start: NaiveDate, shifts: &[ShiftAssignment]) -> f64 {
    let window = DateRange {
        start: week_start,
        end: week_start + chrono::Duration::days(6),
    };
    hours_in_range(person_id, &window, shifts, None)
}

/// Hours over the calendar month containing `month_anchor`.
pub fn monthly_hours(person_id: Uuid, month_anchor: NaiveDate, shifts: &[ShiftAssignment]) -> f64 {
    hours_in_range(person_id, &DateRange::month_of(month_anchor), shifts, None)
}
