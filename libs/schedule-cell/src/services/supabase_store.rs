use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::ScheduleError;
use crate::models::{
    AppointmentBooking, DateRange, Facility, NewShift, ShiftAssignment, ShiftStatus,
};
use crate::services::repository::{FacilityProvider, ScheduleRepository};

const SHIFTS_TABLE: &str = "/rest/v1/shift_assignments";
const APPOINTMENTS_TABLE: &str = "/rest/v1/appointments";
const FACILITIES_TABLE: &str = "/rest/v1/facilities";

/// Shift, booking and facility access over Supabase's REST interface.
pub struct SupabaseScheduleStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseScheduleStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ScheduleError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            None,
            None,
        ).await?;

        let rows = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;

        Ok(rows)
    }

    async fn write_one(&self, method: Method, path: &str, body: Value) -> Result<Option<ShiftAssignment>, ScheduleError> {
        let result: Vec<Value> = self.supabase.request_with_headers(
            method,
            path,
            None,
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}

fn date_filter(column: &str, range: &DateRange) -> String {
    format!("{column}=gte.{}&{column}=lte.{}", range.start, range.end)
}

#[async_trait]
impl ScheduleRepository for SupabaseScheduleStore {
    async fn find_shifts_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<ShiftAssignment>, ScheduleError> {
        debug!("Fetching shifts for person {} from {} to {}", person_id, range.start, range.end);

        let path = format!(
            "{}?person_id=eq.{}&{}&order=shift_date.asc,start_time.asc",
            SHIFTS_TABLE,
            person_id,
            date_filter("shift_date", &range)
        );
        self.fetch(&path).await
    }

    async fn find_shifts_in_range(&self, range: DateRange) -> Result<Vec<ShiftAssignment>, ScheduleError> {
        debug!("Fetching roster shifts from {} to {}", range.start, range.end);

        let path = format!(
            "{}?{}&order=person_id.asc,shift_date.asc,start_time.asc",
            SHIFTS_TABLE,
            date_filter("shift_date", &range)
        );
        self.fetch(&path).await
    }

    async fn find_shift(&self, shift_id: Uuid) -> Result<Option<ShiftAssignment>, ScheduleError> {
        let path = format!("{}?id=eq.{}", SHIFTS_TABLE, shift_id);
        let shifts: Vec<ShiftAssignment> = self.fetch(&path).await?;
        Ok(shifts.into_iter().next())
    }

    async fn insert_shift(&self, shift: NewShift) -> Result<ShiftAssignment, ScheduleError> {
        let now = Utc::now().to_rfc3339();
        let shift_data = json!({
            "person_id": shift.person_id,
            "person_role": shift.person_role,
            "shift_date": shift.shift_date,
            "start_time": shift.start_time,
            "end_time": shift.end_time,
            "location_id": shift.location_id,
            "status": ShiftStatus::Scheduled,
            "created_at": now,
            "updated_at": now
        });

        self.write_one(Method::POST, SHIFTS_TABLE, shift_data)
            .await?
            .ok_or_else(|| ScheduleError::Repository("Failed to create shift".to_string()))
    }

    async fn update_shift(&self, shift: ShiftAssignment) -> Result<ShiftAssignment, ScheduleError> {
        let update_data = json!({
            "start_time": shift.start_time,
            "end_time": shift.end_time,
            "status": shift.status,
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("{}?id=eq.{}", SHIFTS_TABLE, shift.id);
        self.write_one(Method::PATCH, &path, update_data)
            .await?
            .ok_or(ScheduleError::ShiftNotFound(shift.id))
    }

    async fn find_bookings_for_person(
        &self,
        person_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AppointmentBooking>, ScheduleError> {
        debug!("Fetching bookings for doctor {} from {} to {}", person_id, range.start, range.end);

        let path = format!(
            "{}?doctor_id=eq.{}&{}&status=in.(pending,confirmed)&order=appointment_date.asc,start_time.asc",
            APPOINTMENTS_TABLE,
            person_id,
            date_filter("appointment_date", &range)
        );
        self.fetch(&path).await
    }
}

#[async_trait]
impl FacilityProvider for SupabaseScheduleStore {
    async fn get_facility(&self, location_id: Uuid) -> Result<Option<Facility>, ScheduleError> {
        let path = format!("{}?id=eq.{}", FACILITIES_TABLE, location_id);
        let facilities: Vec<Facility> = self.fetch(&path).await?;
        Ok(facilities.into_iter().next())
    }
}
