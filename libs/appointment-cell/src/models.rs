// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate, NaiveDateTime};
use std::fmt;

use shared_database::DatabaseError;
use shared_models::auth::{Role, StaffMember};
use shared_models::error::AppError;

use crate::services::policy::PermissionDenied;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub nurse_id: Option<Uuid>,
    pub patient_id: Uuid,
    /// Wall-clock start as booked; no timezone normalisation is applied.
    pub date_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }

    pub fn involves_staff(&self, user_id: Uuid) -> bool {
        self.doctor_id == user_id || self.nurse_id == Some(user_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Appointment data handed to the store; id and created_at are assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub nurse_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub date_time: NaiveDateTime,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub nurse_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub date_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.status.map_or(true, |status| appointment.status == status)
            && self.date.map_or(true, |date| appointment.date_time.date() == date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableDoctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: Option<String>,
}

impl From<StaffMember> for AvailableDoctor {
    fn from(doctor: StaffMember) -> Self {
        Self {
            id: doctor.id,
            first_name: doctor.first_name,
            last_name: doctor.last_name,
            specialization: doctor.specialization,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Kinds of record a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Appointment,
    Doctor,
    Nurse,
    Patient,
    Report,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Appointment => write!(f, "Appointment"),
            EntityKind::Doctor => write!(f, "Doctor"),
            EntityKind::Nurse => write!(f, "Nurse"),
            EntityKind::Patient => write!(f, "Patient"),
            EntityKind::Report => write!(f, "Report"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Requested time {0} is outside of working hours (8-20)")]
    OutOfHours(NaiveDateTime),

    #[error("Doctor {doctor_id} already has a scheduled appointment at {date_time}")]
    DoubleBooking { doctor_id: Uuid, date_time: NaiveDateTime },

    #[error("Invalid date_time format: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid date format, expected YYYY-MM-DD: {0}")]
    InvalidDate(String),

    #[error("{0} {1} not found")]
    NotFound(EntityKind, Uuid),

    #[error("Selected user {user_id} is not a {expected}")]
    RoleMismatch { user_id: Uuid, expected: Role },

    #[error("{0}")]
    Permission(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for AppointmentError {
    fn from(e: DatabaseError) -> Self {
        AppointmentError::Database(e.to_string())
    }
}

impl From<PermissionDenied> for AppointmentError {
    fn from(e: PermissionDenied) -> Self {
        AppointmentError::Permission(e.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound(..) => AppError::NotFound(e.to_string()),
            AppointmentError::Permission(msg) => AppError::Forbidden(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
            AppointmentError::OutOfHours(_)
            | AppointmentError::DoubleBooking { .. }
            | AppointmentError::InvalidTimestamp(_)
            | AppointmentError::InvalidDate(_)
            | AppointmentError::RoleMismatch { .. }
            | AppointmentError::InvalidStatusTransition(_) => AppError::ValidationError(e.to_string()),
        }
    }
}
