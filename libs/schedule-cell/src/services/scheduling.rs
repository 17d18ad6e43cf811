use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::SchedulingPolicy;

use crate::error::ScheduleError;
use crate::models::{
    DateRange, Facility, OpenSlot, ShiftAssignment, ShiftDraft, ShiftStatus, StaffingReport,
    ValidationResult, WeeklyRosterSnapshot, WorkloadSummary, MINUTES_PER_DAY, week_start,
};
use crate::services::repository::{FacilityProvider, ScheduleRepository};
use crate::services::slots::available_slots;
use crate::services::staffing::audit_week;
use crate::services::validator::ScheduleValidator;
use crate::services::workload::hours_in_range;

/// One async mutex per person. Held across read, validate and persist so two
/// proposals for the same person can never both pass against a stale view.
/// Entries nobody holds are pruned on the next lookup.
#[derive(Default)]
pub struct PersonLocks {
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl PersonLocks {
    pub fn lock_for(&self, person_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(person_id).or_default().clone()
    }
}

/// Wires the pure scheduling components to their collaborators.
pub struct SchedulingService {
    repository: Arc<dyn ScheduleRepository>,
    facilities: Arc<dyn FacilityProvider>,
    validator: ScheduleValidator,
    locks: PersonLocks,
}

impl SchedulingService {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        facilities: Arc<dyn FacilityProvider>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            repository,
            facilities,
            validator: ScheduleValidator::new(policy),
            locks: PersonLocks::default(),
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        self.validator.policy()
    }

    /// Dry run: everything `create_shift` would check, without persisting.
    pub async fn validate_shift(&self, draft: &ShiftDraft) -> Result<ValidationResult, ScheduleError> {
        let (facility, existing) = self.load_context(draft).await?;
        Ok(self.validator.validate(draft, facility.as_ref(), &existing, None))
    }

    pub async fn create_shift(&self, draft: ShiftDraft) -> Result<ShiftAssignment, ScheduleError> {
        let lock = self.locks.lock_for(draft.person_id);
        let _guard = lock.lock().await;

        let (facility, existing) = self.load_context(&draft).await?;
        let new_shift = self.validator.accept(&draft, facility.as_ref(), &existing, None)?;

        let shift = self.repository.insert_shift(new_shift).await?;
        info!("Committed shift {} for person {} on {} ({})",
              shift.id, shift.person_id, shift.shift_date, shift.interval());

        Ok(shift)
    }

    /// Re-times a scheduled shift. The shift is excluded from its own
    /// conflict and workload checks.
    pub async fn update_shift_times(
        &self,
        shift_id: Uuid,
        start_time: String,
        end_time: String,
    ) -> Result<ShiftAssignment, ScheduleError> {
        let current = self.get_shift(shift_id).await?;

        let lock = self.locks.lock_for(current.person_id);
        let _guard = lock.lock().await;

        // Re-read under the lock in case it changed while we waited.
        let current = self.get_shift(shift_id).await?;
        if current.status != ShiftStatus::Scheduled {
            return Err(ScheduleError::InvalidRequest(format!(
                "only scheduled shifts can be re-timed (shift {} is {})",
                shift_id, current.status
            )));
        }

        let draft = ShiftDraft {
            person_id: current.person_id,
            person_role: current.person_role,
            shift_date: current.shift_date,
            start_time,
            end_time,
            location_id: current.location_id,
        };

        let (facility, existing) = self.load_context(&draft).await?;
        let accepted = self.validator.accept(&draft, facility.as_ref(), &existing, Some(shift_id))?;

        let updated = self.repository.update_shift(ShiftAssignment {
            start_time: accepted.start_time,
            end_time: accepted.end_time,
            ..current
        }).await?;

        info!("Re-timed shift {} to {}", updated.id, updated.interval());
        Ok(updated)
    }

    pub async fn transition_status(
        &self,
        shift_id: Uuid,
        next: ShiftStatus,
    ) -> Result<ShiftAssignment, ScheduleError> {
        let current = self.get_shift(shift_id).await?;

        let lock = self.locks.lock_for(current.person_id);
        let _guard = lock.lock().await;

        let current = self.get_shift(shift_id).await?;
        if !current.status.can_transition_to(next) {
            warn!("Rejected transition of shift {} from {} to {}", shift_id, current.status, next);
            return Err(ScheduleError::InvalidStatusTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = self.repository.update_shift(ShiftAssignment {
            status: next,
            ..current
        }).await?;

        info!("Shift {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn get_shift(&self, shift_id: Uuid) -> Result<ShiftAssignment, ScheduleError> {
        self.repository
            .find_shift(shift_id)
            .await?
            .ok_or(ScheduleError::ShiftNotFound(shift_id))
    }

    pub async fn shifts_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<ShiftAssignment>, ScheduleError> {
        self.repository.find_shifts_for_person(person_id, range).await
    }

    pub async fn open_slots(
        &self,
        person_id: Uuid,
        range: DateRange,
        slot_minutes: Option<u32>,
    ) -> Result<Vec<OpenSlot>, ScheduleError> {
        let slot_minutes = slot_minutes.unwrap_or(self.policy().default_slot_minutes);
        if slot_minutes == 0 || slot_minutes > MINUTES_PER_DAY as u32 {
            return Err(ScheduleError::InvalidRequest(format!(
                "slot length must be between 1 and {} minutes",
                MINUTES_PER_DAY
            )));
        }

        debug!("Calculating {}-minute slots for person {} from {} to {}",
               slot_minutes, person_id, range.start, range.end);

        let shifts = self.repository.find_shifts_for_person(person_id, range).await?;
        let bookings = self.repository.find_bookings_for_person(person_id, range).await?;

        let slots: Vec<OpenSlot> =
            available_slots(person_id, range.start, range.end, slot_minutes, &shifts, &bookings).collect();

        debug!("Found {} open slots", slots.len());
        Ok(slots)
    }

    pub async fn workload(&self, person_id: Uuid, date: NaiveDate) -> Result<WorkloadSummary, ScheduleError> {
        let week = DateRange::week_of(date);
        let month = DateRange::month_of(date);
        let shifts = self.repository.find_shifts_for_person(person_id, week.union(&month)).await?;

        let weekly_hours = hours_in_range(person_id, &week, &shifts, None);
        let weekly_ceiling = self.policy().weekly_hour_ceiling;

        Ok(WorkloadSummary {
            person_id,
            reference_date: date,
            week_start: week.start,
            weekly_hours,
            weekly_ceiling,
            weekly_remaining: (weekly_ceiling - weekly_hours).max(0.0),
            month_start: month.start,
            monthly_hours: hours_in_range(person_id, &month, &shifts, None),
            monthly_ceiling: self.policy().monthly_hour_ceiling,
        })
    }

    /// Staffing audit for the Monday-based week containing `date`.
    pub async fn staffing_audit(&self, date: NaiveDate) -> Result<StaffingReport, ScheduleError> {
        let week = DateRange::week_of(date);
        let shifts = self.repository.find_shifts_in_range(week).await?;
        let roster = WeeklyRosterSnapshot::from_shifts(week_start(date), shifts);

        Ok(audit_week(&roster, self.policy()))
    }

    async fn load_context(
        &self,
        draft: &ShiftDraft,
    ) -> Result<(Option<Facility>, Vec<ShiftAssignment>), ScheduleError> {
        let facility = self.facilities.get_facility(draft.location_id).await?;
        if facility.is_none() {
            warn!("Facility {} unknown, skipping operating-hours check", draft.location_id);
        }

        let window = DateRange::week_of(draft.shift_date).union(&DateRange::month_of(draft.shift_date));
        let existing = self.repository.find_shifts_for_person(draft.person_id, window).await?;

        Ok((facility, existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    use crate::models::{PersonRole, TimeOfDay};
    use crate::services::repository::{MockFacilityProvider, MockScheduleRepository};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn draft(person_id: Uuid, start: &str, end: &str) -> ShiftDraft {
        ShiftDraft {
            person_id,
            person_role: PersonRole::Doctor,
            shift_date: monday(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            location_id: Uuid::new_v4(),
        }
    }

    fn stored(person_id: Uuid, start: &str, end: &str, status: ShiftStatus) -> ShiftAssignment {
        ShiftAssignment {
            id: Uuid::new_v4(),
            person_id,
            person_role: PersonRole::Doctor,
            shift_date: monday(),
            start_time: TimeOfDay::parse(start).unwrap(),
            end_time: TimeOfDay::parse(end).unwrap(),
            location_id: Uuid::new_v4(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn no_facilities() -> MockFacilityProvider {
        let mut facilities = MockFacilityProvider::new();
        facilities.expect_get_facility().returning(|_| Ok(None));
        facilities
    }

    #[tokio::test]
    async fn test_rejected_shift_is_never_inserted() {
        let person = Uuid::new_v4();
        let existing = vec![stored(person, "08:00", "12:00", ShiftStatus::Scheduled)];

        let mut repository = MockScheduleRepository::new();
        repository
            .expect_find_shifts_for_person()
            .returning(move |_, _| Ok(existing.clone()));
        repository.expect_insert_shift().never();

        let service = SchedulingService::new(
            Arc::new(repository),
            Arc::new(no_facilities()),
            SchedulingPolicy::default(),
        );

        let result = service.create_shift(draft(person, "10:00", "14:00")).await;

        assert_matches!(result, Err(ScheduleError::Rejected(errors)) if errors.len() == 1);
    }

    #[tokio::test]
    async fn test_accepted_shift_is_inserted_once() {
        let person = Uuid::new_v4();
        let persisted = stored(person, "13:00", "17:00", ShiftStatus::Scheduled);
        let returned = persisted.clone();

        let mut repository = MockScheduleRepository::new();
        repository
            .expect_find_shifts_for_person()
            .returning(|_, _| Ok(Vec::new()));
        repository
            .expect_insert_shift()
            .times(1)
            .withf(move |shift| shift.person_id == person && shift.start_time == TimeOfDay::at(13, 0))
            .returning(move |_| Ok(returned.clone()));

        let service = SchedulingService::new(
            Arc::new(repository),
            Arc::new(no_facilities()),
            SchedulingPolicy::default(),
        );

        let shift = service.create_shift(draft(person, "13:00", "17:00")).await.unwrap();

        assert_eq!(shift.id, persisted.id);
    }

    #[tokio::test]
    async fn test_terminal_status_cannot_change() {
        let shift = stored(Uuid::new_v4(), "07:00", "17:00", ShiftStatus::Completed);
        let shift_id = shift.id;

        let mut repository = MockScheduleRepository::new();
        repository
            .expect_find_shift()
            .returning(move |_| Ok(Some(shift.clone())));
        repository.expect_update_shift().never();

        let service = SchedulingService::new(
            Arc::new(repository),
            Arc::new(no_facilities()),
            SchedulingPolicy::default(),
        );

        let result = service.transition_status(shift_id, ShiftStatus::Cancelled).await;

        assert_matches!(result, Err(ScheduleError::InvalidStatusTransition {
            from: ShiftStatus::Completed,
            to: ShiftStatus::Cancelled,
        }));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut repository = MockScheduleRepository::new();
        repository
            .expect_find_shifts_for_person()
            .returning(|_, _| Err(ScheduleError::Repository("connection refused".to_string())));

        let service = SchedulingService::new(
            Arc::new(repository),
            Arc::new(no_facilities()),
            SchedulingPolicy::default(),
        );

        let result = service.validate_shift(&draft(Uuid::new_v4(), "07:00", "11:00")).await;

        assert_matches!(result, Err(ScheduleError::Repository(_)));
    }

    #[test]
    fn test_person_locks_are_shared_per_person() {
        let locks = PersonLocks::default();
        let person = Uuid::new_v4();

        assert!(Arc::ptr_eq(&locks.lock_for(person), &locks.lock_for(person)));
        assert!(!Arc::ptr_eq(&locks.lock_for(person), &locks.lock_for(Uuid::new_v4())));
    }

    #[test]
    fn test_released_person_locks_are_pruned() {
        let locks = PersonLocks::default();
        let held = locks.lock_for(Uuid::new_v4());

        for _ in 0..10 {
            drop(locks.lock_for(Uuid::new_v4()));
        }
        let last = locks.lock_for(Uuid::new_v4());

        assert_eq!(locks.locks.lock().unwrap().len(), 2);
        drop((held, last));
    }

    #[tokio::test]
    async fn test_status_transition_rereads_under_lock() {
        let shift = stored(Uuid::new_v4(), "07:00", "11:00", ShiftStatus::Scheduled);
        let shift_id = shift.id;
        let cancelled = ShiftAssignment { status: ShiftStatus::Cancelled, ..shift.clone() };

        let mut repository = MockScheduleRepository::new();
        let mut reads = vec![cancelled, shift].into_iter().rev();
        repository
            .expect_find_shift()
            .times(2)
            .returning(move |_| Ok(reads.next()));
        repository.expect_update_shift().never();

        let service = SchedulingService::new(
            Arc::new(repository),
            Arc::new(no_facilities()),
            SchedulingPolicy::default(),
        );

        let result = service.transition_status(shift_id, ShiftStatus::Active).await;

        assert_matches!(result, Err(ScheduleError::InvalidStatusTransition {
            from: ShiftStatus::Cancelled,
            ..
        }));
    }
}
