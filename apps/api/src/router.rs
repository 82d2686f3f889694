use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use report_cell::router::report_routes;
use shared_config::AppConfig;

use crate::backends::Backends;

pub fn create_router(config: Arc<AppConfig>, backends: &Backends) -> Router {
    let api = appointment_routes(config.clone(), backends.appointment_state())
        .merge(report_routes(config, backends.report_state()));

    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/api", api)
}
