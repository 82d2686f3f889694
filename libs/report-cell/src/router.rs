// libs/report-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::ReportState;

pub fn report_routes(config: Arc<AppConfig>, state: ReportState) -> Router {
    Router::new()
        .route("/reports", get(handlers::list_reports).post(handlers::create_report))
        .route("/reports/{report_id}", get(handlers::get_report))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
