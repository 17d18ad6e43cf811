use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::services::SchedulingService;

pub fn schedule_routes(service: Arc<SchedulingService>) -> Router {
    let shift_routes = Router::new()
        .route("/validate", post(handlers::validate_shift))
        .route("/shifts", post(handlers::create_shift))
        .route("/shifts/{shift_id}", get(handlers::get_shift).put(handlers::update_shift_times))
        .route("/shifts/{shift_id}/status", patch(handlers::update_shift_status));

    let person_routes = Router::new()
        .route("/people/{person_id}/shifts", get(handlers::get_person_shifts))
        .route("/people/{person_id}/slots", get(handlers::get_available_slots))
        .route("/people/{person_id}/workload", get(handlers::get_workload));

    let roster_routes = Router::new()
        .route("/staffing/audit", get(handlers::get_staffing_audit));

    Router::new()
        .merge(shift_routes)
        .merge(person_routes)
        .merge(roster_routes)
        .with_state(service)
}
