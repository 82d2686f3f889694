// libs/report-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateReportRequest, ReportError, ReportFilter};
use crate::services::report::ReportService;
use crate::state::ReportState;

#[derive(Debug, Deserialize)]
pub struct ReportQueryParams {
    pub appointment_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

#[axum::debug_handler]
pub async fn create_report(
    State(state): State<ReportState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let report = ReportService::new(&state)
        .create_report(&user, request)
        .await
        .map_err(|e| match e {
            // Unknown references in the body are a client validation failure.
            ReportError::NotFound(..) => AppError::ValidationError(e.to_string()),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(json!(report))))
}

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let report = ReportService::new(&state)
        .get_report(report_id)
        .await?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn list_reports(
    State(state): State<ReportState>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Json<Value>, AppError> {
    let filter = ReportFilter {
        appointment_id: params.appointment_id,
        patient_id: params.patient_id,
    };

    let reports = ReportService::new(&state)
        .list_reports(filter)
        .await?;

    Ok(Json(json!(reports)))
}
