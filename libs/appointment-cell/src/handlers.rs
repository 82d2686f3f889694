// libs/appointment-cell/src/handlers.rs
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

use crate::models::{AppointmentError, AppointmentFilter, AppointmentStatus, CreateAppointmentRequest};
use crate::services::availability::AvailabilityService;
use crate::services::booking::AppointmentBookingService;
use crate::services::parsing::parse_date;
use crate::state::AppointmentState;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableDoctorsQuery {
    pub date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQueryParams {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date: Option<String>,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} query param is required", name)))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_doctors(
    State(state): State<AppointmentState>,
    Query(params): Query<AvailableDoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let date_time = required(&params.date_time, "date_time")?;

    let doctors = AvailabilityService::new(&state)
        .find_available_doctors(date_time)
        .await?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<AppointmentState>,
    Query(params): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = required(&params.doctor_id, "doctor_id")?;
    let date = required(&params.date, "date")?;

    let doctor_id = Uuid::parse_str(doctor_id.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid doctor_id: {}", doctor_id)))?;

    let slots = AvailabilityService::new(&state)
        .find_free_slots(doctor_id, date)
        .await?;

    let formatted: Vec<String> = slots
        .iter()
        .map(|slot| slot.format("%H:%M").to_string())
        .collect();

    Ok(Json(json!(formatted)))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = AppointmentBookingService::new(&state)
        .book_appointment(&user, request)
        .await
        .map_err(|e| match e {
            // Unknown references in the body are a client validation failure.
            AppointmentError::NotFound(..) => AppError::ValidationError(e.to_string()),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentBookingService::new(&state)
        .get_appointment(appointment_id)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Value>, AppError> {
    let date = params.date
        .as_deref()
        .map(parse_date)
        .transpose()?;

    let filter = AppointmentFilter {
        doctor_id: params.doctor_id,
        patient_id: params.patient_id,
        status: params.status,
        date,
    };

    let appointments = AppointmentBookingService::new(&state)
        .list_appointments(filter)
        .await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentBookingService::new(&state)
        .cancel_appointment(&user, appointment_id)
        .await?;

    Ok(Json(json!(appointment)))
}
