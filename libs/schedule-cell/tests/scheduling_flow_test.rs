use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use schedule_cell::models::{PersonRole, ShiftAssignment, ShiftDraft, ShiftStatus, TimeOfDay};
use schedule_cell::services::{InMemoryScheduleStore, SchedulingService};
use schedule_cell::ScheduleError;
use shared_config::SchedulingPolicy;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn service_with(store: &Arc<InMemoryScheduleStore>) -> SchedulingService {
    SchedulingService::new(store.clone(), store.clone(), SchedulingPolicy::default())
}

fn seeded(person_id: Uuid, date: NaiveDate, start: TimeOfDay, end: TimeOfDay) -> ShiftAssignment {
    ShiftAssignment {
        id: Uuid::new_v4(),
        person_id,
        person_role: PersonRole::Staff,
        shift_date: date,
        start_time: start,
        end_time: end,
        location_id: Uuid::nil(),
        status: ShiftStatus::Scheduled,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn draft(person_id: Uuid, date: NaiveDate, start: &str, end: &str) -> ShiftDraft {
    ShiftDraft {
        person_id,
        person_role: PersonRole::Doctor,
        shift_date: date,
        start_time: start.to_string(),
        end_time: end.to_string(),
        location_id: Uuid::nil(),
    }
}

#[tokio::test]
async fn test_balanced_four_person_week_has_no_violations() {
    let store = Arc::new(InMemoryScheduleStore::new());

    for _ in 0..2 {
        let full_timer = Uuid::new_v4();
        let part_timer = Uuid::new_v4();

        for day in 0..6 {
            let date = monday() + Duration::days(day);
            store.seed_shift(seeded(full_timer, date, TimeOfDay::at(7, 0), TimeOfDay::at(17, 0))).await;

            let (start, end) = if day % 2 == 0 {
                (TimeOfDay::at(7, 0), TimeOfDay::at(11, 0))
            } else {
                (TimeOfDay::at(13, 0), TimeOfDay::at(17, 0))
            };
            store.seed_shift(seeded(part_timer, date, start, end)).await;
        }
    }

    let report = service_with(&store).staffing_audit(monday()).await.unwrap();

    assert_eq!(report.roster_size, 4);
    assert!(report.policy_applied);
    assert!(report.violations.is_empty(), "unexpected violations: {:?}", report.violations);
}

#[tokio::test]
async fn test_cancelled_shifts_leave_the_audit() {
    let store = Arc::new(InMemoryScheduleStore::new());
    for _ in 0..4 {
        let mut shift = seeded(Uuid::new_v4(), monday(), TimeOfDay::at(7, 0), TimeOfDay::at(17, 0));
        shift.status = ShiftStatus::Cancelled;
        store.seed_shift(shift).await;
    }

    let report = service_with(&store).staffing_audit(monday()).await.unwrap();

    assert_eq!(report.roster_size, 0);
    assert!(!report.policy_applied);
}

#[tokio::test]
async fn test_weekly_ceiling_blocks_the_53rd_hour() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let person = Uuid::new_v4();

    // Four 12-hour days: 48 hours.
    for day in 0..4 {
        store
            .seed_shift(seeded(person, monday() + Duration::days(day), TimeOfDay::at(6, 0), TimeOfDay::at(18, 0)))
            .await;
    }
    let service = service_with(&store);
    let friday = monday() + Duration::days(4);

    let result = service.create_shift(draft(person, friday, "08:00", "13:00")).await;
    assert_matches!(result, Err(ScheduleError::Rejected(errors)) if errors[0].contains("53.00"));

    let accepted = service.create_shift(draft(person, friday, "08:00", "12:00")).await;
    assert!(accepted.is_ok());
}

#[tokio::test]
async fn test_retime_does_not_conflict_with_itself() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let service = service_with(&store);
    let person = Uuid::new_v4();

    let shift = service.create_shift(draft(person, monday(), "09:00", "13:00")).await.unwrap();
    let updated = service
        .update_shift_times(shift.id, "10:00".to_string(), "14:00".to_string())
        .await
        .unwrap();

    assert_eq!(updated.start_time, TimeOfDay::at(10, 0));
    let listing = service
        .shifts_for_person(person, schedule_cell::models::DateRange::single(monday()))
        .await
        .unwrap();
    assert_eq!(listing.len(), 1);
}

#[tokio::test]
async fn test_started_shift_cannot_be_retimed() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let service = service_with(&store);

    let shift = service.create_shift(draft(Uuid::new_v4(), monday(), "09:00", "13:00")).await.unwrap();
    service.transition_status(shift.id, ShiftStatus::Active).await.unwrap();

    let result = service
        .update_shift_times(shift.id, "10:00".to_string(), "14:00".to_string())
        .await;

    assert_matches!(result, Err(ScheduleError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_concurrent_overlapping_proposals_commit_once() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let service = Arc::new(service_with(&store));
    let person = Uuid::new_v4();

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.create_shift(draft(person, monday(), "08:00", "12:00")).await })
    };
    let second = {
        let service = service.clone();
        tokio::spawn(async move { service.create_shift(draft(person, monday(), "10:00", "14:00")).await })
    };

    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let stored = service
        .shifts_for_person(person, schedule_cell::models::DateRange::single(monday()))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_zero_slot_length_is_rejected() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let service = service_with(&store);

    let result = service
        .open_slots(Uuid::new_v4(), schedule_cell::models::DateRange::single(monday()), Some(0))
        .await;

    assert_matches!(result, Err(ScheduleError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_cancel_racing_a_retime_stays_cancelled() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let service = Arc::new(service_with(&store));
    let person = Uuid::new_v4();
    let shift_id = service.create_shift(draft(person, monday(), "09:00", "13:00")).await.unwrap().id;

    let retime = {
        let service = service.clone();
        tokio::spawn(async move {
            service.update_shift_times(shift_id, "10:00".to_string(), "14:00".to_string()).await
        })
    };
    let cancel = {
        let service = service.clone();
        tokio::spawn(async move { service.transition_status(shift_id, ShiftStatus::Cancelled).await })
    };

    let (_, cancelled) = (retime.await.unwrap(), cancel.await.unwrap());

    assert!(cancelled.is_ok());
    assert_eq!(service.get_shift(shift_id).await.unwrap().status, ShiftStatus::Cancelled);
}

#[tokio::test]
async fn test_slot_length_beyond_a_day_is_rejected() {
    let store = Arc::new(InMemoryScheduleStore::new());
    let service = service_with(&store);
    let person = Uuid::new_v4();
    service.create_shift(draft(person, monday(), "07:00", "17:00")).await.unwrap();

    let range = schedule_cell::models::DateRange::single(monday());
    let result = service.open_slots(person, range, Some(u32::MAX)).await;

    assert_matches!(result, Err(ScheduleError::InvalidRequest(_)));
    assert_eq!(service.open_slots(person, range, Some(600)).await.unwrap().len(), 1);
}
