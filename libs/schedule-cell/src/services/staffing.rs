use tracing::{debug, info};

use shared_config::SchedulingPolicy;

use crate::models::{PersonShiftPattern, StaffingReport, WeeklyRosterSnapshot};
use crate::services::classifier::classify;

/// Classifies every person's week and evaluates the roster-wide staffing
/// rules. Rules are only evaluated once the roster reaches
/// `policy.min_audit_roster_size`; violations come out in rule order.
pub fn audit_week(roster: &WeeklyRosterSnapshot, policy: &SchedulingPolicy) -> StaffingReport {
    let people: Vec<PersonShiftPattern> = roster
        .shifts_by_person
        .iter()
        .map(|(person_id, shifts)| {
            let classifications: Vec<_> = shifts.iter().map(|shift| classify(&shift.interval())).collect();

            PersonShiftPattern {
                person_id: *person_id,
                total_shifts: shifts.len(),
                full_time_days: classifications.iter().filter(|c| c.is_qualifying_full_time()).count(),
                part_time_shifts: classifications.iter().filter(|c| c.is_qualifying_part_time()).count(),
            }
        })
        .collect();

    let roster_size = roster.roster_size();
    let policy_applied = roster_size >= policy.min_audit_roster_size;

    let violations = if policy_applied {
        evaluate_rules(&people, policy.required_weekly_shifts)
    } else {
        debug!("Roster of {} is below {}, staffing rules skipped",
               roster_size, policy.min_audit_roster_size);
        Vec::new()
    };

    info!("Staffing audit for week of {}: {} people, {} violations",
          roster.week_start, roster_size, violations.len());

    StaffingReport {
        week_start: roster.week_start,
        roster_size,
        policy_applied,
        people,
        violations,
    }
}

fn evaluate_rules(people: &[PersonShiftPattern], required: usize) -> Vec<String> {
    let exact_full_time = people.iter().filter(|p| p.full_time_days == required).count();
    let exact_part_time = people.iter().filter(|p| p.part_time_shifts == required).count();
    let over_full_time = people.iter().filter(|p| p.full_time_days > required).count();
    let over_part_time = people.iter().filter(|p| p.part_time_shifts > required).count();

    let mut violations = Vec::new();

    if exact_full_time == 0 {
        violations.push(format!(
            "No one works exactly {} qualifying full-time days (found {} people)",
            required, exact_full_time
        ));
    }
    if exact_part_time == 0 {
        violations.push(format!(
            "No one works exactly {} qualifying part-time shifts (found {} people)",
            required, exact_part_time
        ));
    }
    if over_full_time > 1 {
        violations.push(format!(
            "{} people work more than {} qualifying full-time days; at most one is allowed",
            over_full_time, required
        ));
    }
    if over_part_time > 1 {
        violations.push(format!(
            "{} people work more than {} qualifying part-time shifts; at most one is allowed",
            over_part_time, required
        ));
    }

    violations
}
