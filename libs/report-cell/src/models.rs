// libs/report-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use appointment_cell::models::{AppointmentStatus, EntityKind};
use appointment_cell::services::policy::PermissionDenied;
use shared_database::DatabaseError;
use shared_models::auth::Role;
use shared_models::error::AppError;

// ==============================================================================
// CORE REPORT MODELS
// ==============================================================================

/// Diagnostic report; at most one per appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub nurse_id: Option<Uuid>,
    pub diagnosis: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub nurse_id: Option<Uuid>,
    pub diagnosis: String,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportRequest {
    pub appointment_id: Uuid,
    pub diagnosis: String,
    pub nurse_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub appointment_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        self.appointment_id.map_or(true, |id| report.appointment_id == id)
            && self.patient_id.map_or(true, |id| report.patient_id == id)
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    #[error("{0} {1} not found")]
    NotFound(EntityKind, Uuid),

    #[error("{0}")]
    Permission(String),

    #[error("Appointment {0} already has a report")]
    DuplicateReport(Uuid),

    #[error("Selected user {user_id} is not a {expected}")]
    RoleMismatch { user_id: Uuid, expected: Role },

    #[error("Cannot write a report for an appointment in status: {0}")]
    InvalidAppointmentStatus(AppointmentStatus),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for ReportError {
    fn from(e: DatabaseError) -> Self {
        ReportError::Database(e.to_string())
    }
}

impl From<PermissionDenied> for ReportError {
    fn from(e: PermissionDenied) -> Self {
        ReportError::Permission(e.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::NotFound(..) => AppError::NotFound(e.to_string()),
            ReportError::Permission(msg) => AppError::Forbidden(msg),
            ReportError::Database(msg) => AppError::Database(msg),
            ReportError::DuplicateReport(_)
            | ReportError::RoleMismatch { .. }
            | ReportError::InvalidAppointmentStatus(_)
            | ReportError::Validation(_) => AppError::ValidationError(e.to_string()),
        }
    }
}
