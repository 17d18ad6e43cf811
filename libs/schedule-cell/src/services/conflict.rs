use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Interval, ShiftAssignment};
use crate::services::time::overlaps;

/// Existing committed shifts that collide with `proposed`.
///
/// Only shifts for `person_id` on `date` are considered; cancelled shifts and
/// the one named by `exclude_id` (an update in place) are skipped.
pub fn find_conflicts<'a>(
    person_id: Uuid,
    date: NaiveDate,
    proposed: &Interval,
    existing: &'a [ShiftAssignment],
    exclude_id: Option<Uuid>,
) -> Vec<&'a ShiftAssignment> {
    existing
        .iter()
        .filter(|shift| shift.person_id == person_id && shift.shift_date == date)
        .filter(|shift| shift.is_committed())
        .filter(|shift| Some(shift.id) != exclude_id)
        .filter(|shift| !shift.interval().is_well_formed() || overlaps(proposed, &shift.interval()))
        .collect()
}

/// Fail-safe: a malformed proposal, or a malformed existing shift on the same
/// day, counts as a conflict.
pub fn has_conflict(
    person_id: Uuid,
    date: NaiveDate,
    proposed: &Interval,
    existing: &[ShiftAssignment],
    exclude_id: Option<Uuid>,
) -> bool {
    debug!("Checking conflicts for person {} on {} at {}", person_id, date, proposed);

    if !proposed.is_well_formed() {
        warn!("Malformed interval {} treated as a conflict", proposed);
        return true;
    }

    let conflicts = find_conflicts(person_id, date, proposed, existing, exclude_id);
    if !conflicts.is_empty() {
        warn!("Conflict detected for person {} on {} - {} colliding shifts",
              person_id, date, conflicts.len());
    }

    !conflicts.is_empty()
}
