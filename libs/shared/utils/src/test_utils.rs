use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingPolicy};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub scheduling: SchedulingPolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            scheduling: SchedulingPolicy::default(),
        }
    }
}

impl TestConfig {
    /// Points the config at a mock server, e.g. `MockServer::uri()`.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            server_port: 0,
            scheduling: self.scheduling.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned PostgREST rows for the schedule tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn shift_row(
        shift_id: Uuid,
        person_id: Uuid,
        date: NaiveDate,
        start_time: &str,
        end_time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": shift_id,
            "person_id": person_id,
            "person_role": "doctor",
            "shift_date": date,
            "start_time": start_time,
            "end_time": end_time,
            "location_id": Uuid::nil(),
            "status": status,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn booking_row(
        doctor_id: Uuid,
        date: NaiveDate,
        start_time: &str,
        end_time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "appointment_date": date,
            "start_time": start_time,
            "end_time": end_time,
            "status": status
        })
    }

    /// Weekday clinic open 07:00-19:00, Saturday mornings, closed Sunday.
    pub fn facility_row(location_id: Uuid) -> Value {
        json!({
            "id": location_id,
            "name": "Main Clinic",
            "operating_hours": {
                "Mon": { "start": "07:00", "end": "19:00" },
                "Tue": { "start": "07:00", "end": "19:00" },
                "Wed": { "start": "07:00", "end": "19:00" },
                "Thu": { "start": "07:00", "end": "19:00" },
                "Fri": { "start": "07:00", "end": "19:00" },
                "Sat": { "start": "08:00", "end": "12:00" }
            }
        })
    }
}
