use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::SchedulingPolicy;

use crate::error::ScheduleError;
use crate::models::{
    DateRange, Facility, Interval, NewShift, ShiftAssignment, ShiftDraft, TimeOfDay,
    ValidationResult,
};
use crate::services::conflict::find_conflicts;
use crate::services::operating_hours::check_operating_hours;
use crate::services::time::{duration_minutes, minutes_to_hours};
use crate::services::workload::hours_in_range;

/// Single-shot pre-commit validation. Every failing check is reported; nothing
/// short-circuits except that checks needing a usable interval are skipped
/// when the times themselves are broken.
#[derive(Debug, Clone)]
pub struct ScheduleValidator {
    policy: SchedulingPolicy,
}

impl ScheduleValidator {
    pub fn new(policy: SchedulingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn validate(
        &self,
        draft: &ShiftDraft,
        facility: Option<&Facility>,
        existing: &[ShiftAssignment],
        exclude_id: Option<Uuid>,
    ) -> ValidationResult {
        ValidationResult::from_errors(self.collect_errors(draft, facility, existing, exclude_id))
    }

    /// Validates and, on success, hands back the draft in persistable form.
    pub fn accept(
        &self,
        draft: &ShiftDraft,
        facility: Option<&Facility>,
        existing: &[ShiftAssignment],
        exclude_id: Option<Uuid>,
    ) -> Result<NewShift, ScheduleError> {
        let errors = self.collect_errors(draft, facility, existing, exclude_id);
        if !errors.is_empty() {
            warn!("Rejected shift for person {} on {}: {} problems",
                  draft.person_id, draft.shift_date, errors.len());
            return Err(ScheduleError::Rejected(errors.iter().map(ToString::to_string).collect()));
        }

        let interval = Interval::parse(&draft.start_time, &draft.end_time)?;
        Ok(NewShift {
            person_id: draft.person_id,
            person_role: draft.person_role,
            shift_date: draft.shift_date,
            start_time: interval.start,
            end_time: interval.end,
            location_id: draft.location_id,
        })
    }

    pub fn collect_errors(
        &self,
        draft: &ShiftDraft,
        facility: Option<&Facility>,
        existing: &[ShiftAssignment],
        exclude_id: Option<Uuid>,
    ) -> Vec<ScheduleError> {
        debug!("Validating shift for person {} on {} ({}-{})",
               draft.person_id, draft.shift_date, draft.start_time, draft.end_time);

        let mut errors = Vec::new();

        // 1. format
        let start = TimeOfDay::parse(&draft.start_time).map_err(|e| errors.push(e)).ok();
        let end = TimeOfDay::parse(&draft.end_time).map_err(|e| errors.push(e)).ok();

        let (Some(start), Some(end)) = (start, end) else {
            return errors;
        };

        // 2. ordering
        let proposed = match Interval::new(start, end) {
            Ok(interval) => interval,
            Err(e) => {
                errors.push(e);
                return errors;
            }
        };

        // 3. conflicts
        for shift in find_conflicts(draft.person_id, draft.shift_date, &proposed, existing, exclude_id) {
            errors.push(ScheduleError::Conflict {
                shift_id: shift.id,
                start: proposed.start.to_string(),
                end: proposed.end.to_string(),
                existing: shift.interval().to_string(),
            });
        }

        // 4. operating hours
        if let Some(facility) = facility {
            if let Err(e) = check_operating_hours(facility, draft.shift_date, &proposed) {
                errors.push(e);
            }
        }

        // 5. weekly ceiling, counting the proposal itself
        let proposed_hours = minutes_to_hours(duration_minutes(&proposed) as i64);
        let week = DateRange::week_of(draft.shift_date);
        let weekly_total = hours_in_range(draft.person_id, &week, existing, exclude_id) + proposed_hours;
        if weekly_total > self.policy.weekly_hour_ceiling {
            errors.push(ScheduleError::CeilingExceeded {
                period: "Weekly".to_string(),
                total_hours: weekly_total,
                ceiling: self.policy.weekly_hour_ceiling,
            });
        }

        // 6. optional monthly ceiling
        if let Some(ceiling) = self.policy.monthly_hour_ceiling {
            let month = DateRange::month_of(draft.shift_date);
            let monthly_total = hours_in_range(draft.person_id, &month, existing, exclude_id) + proposed_hours;
            if monthly_total > ceiling {
                errors.push(ScheduleError::CeilingExceeded {
                    period: "Monthly".to_string(),
                    total_hours: monthly_total,
                    ceiling,
                });
            }
        }

        errors
    }
}
