// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, Directory};
use shared_models::auth::{Role, StaffMember, User};

use crate::models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentStatus,
    CreateAppointmentRequest, EntityKind, NewAppointment,
};
use crate::services::parsing::parse_date_time;
use crate::services::policy::{authorize, Capability};
use crate::services::store::AppointmentStore;
use crate::services::validator::BookingValidator;
use crate::state::AppointmentState;

pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn Directory>,
    validator: BookingValidator,
}

impl AppointmentBookingService {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            store: Arc::clone(&state.appointments),
            directory: Arc::clone(&state.directory),
            validator: BookingValidator::new(Arc::clone(&state.appointments)),
        }
    }

    /// Book a doctor (and optionally a nurse) for a patient.
    pub async fn book_appointment(
        &self,
        principal: &User,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment for patient {} with doctor {} at {}",
              request.patient_id, request.doctor_id, request.date_time);

        authorize(principal, Capability::BookAppointment)?;

        let date_time = parse_date_time(&request.date_time)?;

        // **Step 1: Resolve references**
        self.resolve_staff(request.doctor_id, Role::Doctor, EntityKind::Doctor).await?;
        if let Some(nurse_id) = request.nurse_id {
            self.resolve_staff(nurse_id, Role::Nurse, EntityKind::Nurse).await?;
        }
        if self.directory.get_patient(request.patient_id).await?.is_none() {
            return Err(AppointmentError::NotFound(EntityKind::Patient, request.patient_id));
        }

        // **Step 2: Business hours and double booking**
        self.validator.validate(request.doctor_id, date_time).await?;

        // **Step 3: Persist; the store re-checks the slot atomically**
        let appointment = self.store
            .insert_scheduled(NewAppointment {
                doctor_id: request.doctor_id,
                nurse_id: request.nurse_id,
                patient_id: request.patient_id,
                date_time,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => {
                    warn!("Slot for doctor {} at {} taken concurrently", request.doctor_id, date_time);
                    AppointmentError::DoubleBooking { doctor_id: request.doctor_id, date_time }
                }
                other => other.into(),
            })?;

        info!("Appointment {} booked with doctor {}", appointment.id, appointment.doctor_id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        self.store
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound(EntityKind::Appointment, appointment_id))
    }

    pub async fn list_appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments with filter {:?}", filter);
        Ok(self.store.list(&filter).await?)
    }

    /// Cancel a scheduled appointment, freeing its slot.
    pub async fn cancel_appointment(
        &self,
        principal: &User,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        authorize(principal, Capability::CancelAppointment(&appointment))?;

        if appointment.status != AppointmentStatus::Scheduled {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let cancelled = self.store
            .update_status(appointment_id, AppointmentStatus::Cancelled)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => AppointmentError::NotFound(EntityKind::Appointment, appointment_id),
                other => other.into(),
            })?;

        info!("Appointment {} cancelled by {}", appointment_id, principal.id);
        Ok(cancelled)
    }

    async fn resolve_staff(
        &self,
        user_id: Uuid,
        expected: Role,
        kind: EntityKind,
    ) -> Result<StaffMember, AppointmentError> {
        let user = self.directory
            .get_user(user_id)
            .await?
            .ok_or(AppointmentError::NotFound(kind, user_id))?;

        if user.role != expected {
            return Err(AppointmentError::RoleMismatch { user_id, expected });
        }

        Ok(user)
    }
}
