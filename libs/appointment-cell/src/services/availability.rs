use std::sync::Arc;

use chrono::NaiveTime;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::Directory;
use shared_models::auth::Role;

use crate::models::{AppointmentError, AvailableDoctor, EntityKind};
use crate::services::parsing::{parse_date, parse_date_time};
use crate::services::slots::SlotCalculator;
use crate::services::store::AppointmentStore;
use crate::services::validator::BookingValidator;
use crate::state::AppointmentState;

pub struct AvailabilityService {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn Directory>,
    slot_calculator: SlotCalculator,
}

impl AvailabilityService {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            store: Arc::clone(&state.appointments),
            directory: Arc::clone(&state.directory),
            slot_calculator: SlotCalculator::new(Arc::clone(&state.appointments)),
        }
    }

    /// Doctors without a scheduled appointment at exactly `date_time`.
    pub async fn find_available_doctors(&self, date_time: &str) -> Result<Vec<AvailableDoctor>, AppointmentError> {
        let date_time = parse_date_time(date_time)?;
        BookingValidator::check_business_hours(&date_time)?;

        let doctors = self.directory.list_users_by_role(Role::Doctor).await?;
        let busy = self.store.busy_doctors_at(date_time).await?;

        let available: Vec<AvailableDoctor> = doctors
            .into_iter()
            .filter(|doctor| !busy.contains(&doctor.id))
            .map(AvailableDoctor::from)
            .collect();

        info!("{} doctors available at {} ({} busy)", available.len(), date_time, busy.len());
        Ok(available)
    }

    /// Free 30-minute slots of a doctor on a date.
    pub async fn find_free_slots(&self, doctor_id: Uuid, date: &str) -> Result<Vec<NaiveTime>, AppointmentError> {
        let date = parse_date(date)?;

        let is_doctor = self.directory
            .get_user(doctor_id)
            .await?
            .is_some_and(|user| user.role == Role::Doctor);
        if !is_doctor {
            debug!("Slot query for unknown doctor {}", doctor_id);
            return Err(AppointmentError::NotFound(EntityKind::Doctor, doctor_id));
        }

        self.slot_calculator.compute_free_slots(doctor_id, date).await
    }
}
