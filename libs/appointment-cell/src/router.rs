// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(config: Arc<AppConfig>, state: AppointmentState) -> Router {
    // All scheduling operations require an authenticated principal
    Router::new()
        .route("/available-doctors", get(handlers::get_available_doctors))
        .route("/appointments", post(handlers::book_appointment).get(handlers::list_appointments))
        .route("/appointments/available-slots", get(handlers::get_available_slots))
        .route("/appointments/{appointment_id}", get(handlers::get_appointment))
        .route("/appointments/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
