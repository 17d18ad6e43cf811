use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::error::ScheduleError;
use crate::models::{
    AppointmentBooking, DateRange, Facility, NewShift, ShiftAssignment, ShiftStatus,
};

/// Storage for committed shifts and the bookings that consume their slots.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find_shifts_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<ShiftAssignment>, ScheduleError>;

    /// Every person's shifts in `range`, for roster-wide reports.
    async fn find_shifts_in_range(&self, range: DateRange) -> Result<Vec<ShiftAssignment>, ScheduleError>;

    async fn find_shift(&self, shift_id: Uuid) -> Result<Option<ShiftAssignment>, ScheduleError>;

    async fn insert_shift(&self, shift: NewShift) -> Result<ShiftAssignment, ScheduleError>;

    /// Persists `shift` over the stored row with the same id.
    async fn update_shift(&self, shift: ShiftAssignment) -> Result<ShiftAssignment, ScheduleError>;

    async fn find_bookings_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AppointmentBooking>, ScheduleError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FacilityProvider: Send + Sync {
    async fn get_facility(&self, location_id: Uuid) -> Result<Option<Facility>, ScheduleError>;
}

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    shifts: RwLock<HashMap<Uuid, ShiftAssignment>>,
    bookings: RwLock<Vec<AppointmentBooking>>,
    facilities: RwLock<HashMap<Uuid, Facility>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_booking(&self, booking: AppointmentBooking) {
        self.bookings.write().await.push(booking);
    }

    pub async fn add_facility(&self, facility: Facility) {
        self.facilities.write().await.insert(facility.location_id, facility);
    }

    /// Stores a shift as-is, bypassing validation. Useful for seeding.
    pub async fn seed_shift(&self, shift: ShiftAssignment) {
        self.shifts.write().await.insert(shift.id, shift);
    }
}

fn sorted(mut shifts: Vec<ShiftAssignment>) -> Vec<ShiftAssignment> {
    shifts.sort_by_key(|shift| (shift.shift_date, shift.start_time));
    shifts
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleStore {
    async fn find_shifts_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<ShiftAssignment>, ScheduleError> {
        let shifts = self.shifts.read().await;
        Ok(sorted(
            shifts
                .values()
                .filter(|shift| shift.person_id == person_id && range.contains(shift.shift_date))
                .cloned()
                .collect(),
        ))
    }

    async fn find_shifts_in_range(&self, range: DateRange) -> Result<Vec<ShiftAssignment>, ScheduleError> {
        let shifts = self.shifts.read().await;
        Ok(sorted(
            shifts
                .values()
                .filter(|shift| range.contains(shift.shift_date))
                .cloned()
                .collect(),
        ))
    }

    async fn find_shift(&self, shift_id: Uuid) -> Result<Option<ShiftAssignment>, ScheduleError> {
        Ok(self.shifts.read().await.get(&shift_id).cloned())
    }

    async fn insert_shift(&self, shift: NewShift) -> Result<ShiftAssignment, ScheduleError> {
        let now = Utc::now();
        let stored = ShiftAssignment {
            id: Uuid::new_v4(),
            person_id: shift.person_id,
            person_role: shift.person_role,
            shift_date: shift.shift_date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            location_id: shift.location_id,
            status: ShiftStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        self.shifts.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_shift(&self, mut shift: ShiftAssignment) -> Result<ShiftAssignment, ScheduleError> {
        let mut shifts = self.shifts.write().await;
        if !shifts.contains_key(&shift.id) {
            return Err(ScheduleError::ShiftNotFound(shift.id));
        }

        shift.updated_at = Utc::now();
        shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn find_bookings_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AppointmentBooking>, ScheduleError> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|booking| booking.doctor_id == person_id && range.contains(booking.appointment_date))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FacilityProvider for InMemoryScheduleStore {
    async fn get_facility(&self, location_id: Uuid) -> Result<Option<Facility>, ScheduleError> {
        Ok(self.facilities.read().await.get(&location_id).cloned())
    }
}
