// libs/report-cell/src/services/report.rs
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus, EntityKind};
use appointment_cell::services::policy::{authorize, Capability};
use appointment_cell::services::AppointmentStore;
use shared_database::{DatabaseError, Directory};
use shared_models::auth::{Role, User};

use crate::models::{CreateReportRequest, NewReport, Report, ReportError, ReportFilter};
use crate::services::store::ReportStore;
use crate::state::ReportState;

pub struct ReportService {
    appointments: Arc<dyn AppointmentStore>,
    reports: Arc<dyn ReportStore>,
    directory: Arc<dyn Directory>,
}

impl ReportService {
    pub fn new(state: &ReportState) -> Self {
        Self {
            appointments: Arc::clone(&state.appointments),
            reports: Arc::clone(&state.reports),
            directory: Arc::clone(&state.directory),
        }
    }

    /// Record the diagnosis for an appointment and mark it completed.
    pub async fn create_report(
        &self,
        principal: &User,
        request: CreateReportRequest,
    ) -> Result<Report, ReportError> {
        info!("Creating report for appointment {} by {}", request.appointment_id, principal.id);

        // **Step 1: Resolve the appointment**
        let appointment = self.appointments
            .get(request.appointment_id)
            .await?
            .ok_or(ReportError::NotFound(EntityKind::Appointment, request.appointment_id))?;

        // **Step 2: Only the assigned doctor may report**
        authorize(principal, Capability::CreateReport(&appointment))?;

        // **Step 3: One report per appointment**
        if self.reports.find_by_appointment(appointment.id).await?.is_some() {
            return Err(ReportError::DuplicateReport(appointment.id));
        }
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(ReportError::InvalidAppointmentStatus(appointment.status));
        }

        // **Step 4: Optional attending nurse**
        if let Some(nurse_id) = request.nurse_id {
            self.resolve_nurse(nurse_id).await?;
        }

        let diagnosis = request.diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(ReportError::Validation("diagnosis must not be empty".to_string()));
        }

        // **Step 5: Persist with doctor and patient taken from the appointment**
        let report = self.reports
            .insert(NewReport {
                appointment_id: appointment.id,
                doctor_id: appointment.doctor_id,
                patient_id: appointment.patient_id,
                nurse_id: request.nurse_id,
                diagnosis: diagnosis.to_string(),
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => {
                    warn!("Report for appointment {} written concurrently", appointment.id);
                    ReportError::DuplicateReport(appointment.id)
                }
                other => other.into(),
            })?;

        // **Step 6: Complete the appointment**
        self.complete_appointment(&appointment, report.id).await?;

        info!("Report {} created for appointment {}", report.id, appointment.id);
        Ok(report)
    }

    pub async fn get_report(&self, report_id: Uuid) -> Result<Report, ReportError> {
        debug!("Fetching report: {}", report_id);

        self.reports
            .get(report_id)
            .await?
            .ok_or(ReportError::NotFound(EntityKind::Report, report_id))
    }

    pub async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<Report>, ReportError> {
        debug!("Listing reports with filter {:?}", filter);
        Ok(self.reports.list(&filter).await?)
    }

    async fn resolve_nurse(&self, nurse_id: Uuid) -> Result<(), ReportError> {
        let user = self.directory
            .get_user(nurse_id)
            .await?
            .ok_or(ReportError::NotFound(EntityKind::Nurse, nurse_id))?;

        if user.role != Role::Nurse {
            return Err(ReportError::RoleMismatch { user_id: nurse_id, expected: Role::Nurse });
        }

        Ok(())
    }

    async fn complete_appointment(&self, appointment: &Appointment, report_id: Uuid) -> Result<(), ReportError> {
        self.appointments
            .update_status(appointment.id, AppointmentStatus::Completed)
            .await
            .map_err(|e| {
                error!("Report {} stored but appointment {} was not completed: {}", report_id, appointment.id, e);
                ReportError::from(e)
            })?;

        Ok(())
    }
}
