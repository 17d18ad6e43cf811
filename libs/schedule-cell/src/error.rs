use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::ShiftStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid time format '{value}': expected HH:MM (24-hour, zero-padded)")]
    Format { value: String },

    #[error("End time {end} must be after start time {start}")]
    Ordering { start: String, end: String },

    #[error("Shift {start}-{end} conflicts with existing shift {shift_id} ({existing})")]
    Conflict {
        shift_id: Uuid,
        start: String,
        end: String,
        existing: String,
    },

    #[error("{period} hours would reach {total_hours:.2}, exceeding the ceiling of {ceiling:.2}")]
    CeilingExceeded {
        period: String,
        total_hours: f64,
        ceiling: f64,
    },

    #[error("Shift {interval} falls outside operating hours on {weekday}: {reason}")]
    OutOfHours {
        weekday: String,
        interval: String,
        reason: String,
    },

    #[error("Shift not found: {0}")]
    ShiftNotFound(Uuid),

    #[error("Facility not found: {0}")]
    FacilityNotFound(Uuid),

    #[error("Invalid shift status transition from {from} to {to}")]
    InvalidStatusTransition { from: ShiftStatus, to: ShiftStatus },

    #[error("Schedule rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl ScheduleError {
    pub fn format(value: &str) -> Self {
        ScheduleError::Format { value: value.to_string() }
    }
}

impl From<anyhow::Error> for ScheduleError {
    fn from(err: anyhow::Error) -> Self {
        ScheduleError::Repository(err.to_string())
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::Repository(format!("Failed to parse row: {}", err))
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Rejected(errors) => AppError::Rejected(errors),
            ScheduleError::ShiftNotFound(_) | ScheduleError::FacilityNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ScheduleError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            ScheduleError::InvalidRequest(_) => AppError::BadRequest(err.to_string()),
            ScheduleError::Repository(msg) => AppError::Database(msg),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}
