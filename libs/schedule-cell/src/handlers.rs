use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    DateRange, ShiftAssignment, ShiftDraft, StaffingReport, UpdateShiftStatusRequest,
    UpdateShiftTimesRequest, ValidationResult, WorkloadSummary,
};
use crate::services::SchedulingService;

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    /// Defaults to `start_date`.
    pub end_date: Option<NaiveDate>,
}

impl DateRangeQuery {
    fn range(&self) -> Result<DateRange, AppError> {
        DateRange::new(self.start_date, self.end_date.unwrap_or(self.start_date))
            .map_err(AppError::from)
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub slot_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct WorkloadQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub week_start: NaiveDate,
}

// ==============================================================================
// SHIFT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn validate_shift(
    State(service): State<Arc<SchedulingService>>,
    Json(draft): Json<ShiftDraft>,
) -> Result<Json<ValidationResult>, AppError> {
    let result = service.validate_shift(&draft).await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn create_shift(
    State(service): State<Arc<SchedulingService>>,
    Json(draft): Json<ShiftDraft>,
) -> Result<(StatusCode, Json<ShiftAssignment>), AppError> {
    let shift = service.create_shift(draft).await?;
    Ok((StatusCode::CREATED, Json(shift)))
}

#[axum::debug_handler]
pub async fn get_shift(
    State(service): State<Arc<SchedulingService>>,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<ShiftAssignment>, AppError> {
    let shift = service.get_shift(shift_id).await?;
    Ok(Json(shift))
}

#[axum::debug_handler]
pub async fn update_shift_times(
    State(service): State<Arc<SchedulingService>>,
    Path(shift_id): Path<Uuid>,
    Json(request): Json<UpdateShiftTimesRequest>,
) -> Result<Json<ShiftAssignment>, AppError> {
    let shift = service
        .update_shift_times(shift_id, request.start_time, request.end_time)
        .await?;
    Ok(Json(shift))
}

#[axum::debug_handler]
pub async fn update_shift_status(
    State(service): State<Arc<SchedulingService>>,
    Path(shift_id): Path<Uuid>,
    Json(request): Json<UpdateShiftStatusRequest>,
) -> Result<Json<ShiftAssignment>, AppError> {
    let shift = service.transition_status(shift_id, request.status).await?;
    Ok(Json(shift))
}

// ==============================================================================
// PERSON HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_person_shifts(
    State(service): State<Arc<SchedulingService>>,
    Path(person_id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let shifts = service.shifts_for_person(person_id, query.range()?).await?;

    Ok(Json(json!({
        "person_id": person_id,
        "shifts": shifts,
        "total": shifts.len()
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(service): State<Arc<SchedulingService>>,
    Path(person_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let range = DateRange::new(query.start_date, query.end_date.unwrap_or(query.start_date))?;
    let slots = service.open_slots(person_id, range, query.slot_minutes).await?;

    Ok(Json(json!({
        "person_id": person_id,
        "available_slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_workload(
    State(service): State<Arc<SchedulingService>>,
    Path(person_id): Path<Uuid>,
    Query(query): Query<WorkloadQuery>,
) -> Result<Json<WorkloadSummary>, AppError> {
    let summary = service.workload(person_id, query.date).await?;
    Ok(Json(summary))
}

// ==============================================================================
// ROSTER HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_staffing_audit(
    State(service): State<Arc<SchedulingService>>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<StaffingReport>, AppError> {
    let report = service.staffing_audit(query.week_start).await?;
    Ok(Json(report))
}
